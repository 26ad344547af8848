use async_trait::async_trait;
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, HeaderName, RANGE};
use reqwest::{Client, StatusCode};
use std::io::{Error, Result};
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::ReadAt;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ATTEMPTS: u32 = 10;

/// Byte source for an archive on a server that honors `Range` requests.
///
/// Each `read_at` is an independent ranged GET, so concurrent entry
/// streams never share request state.
pub struct HttpRangeReader {
    client: Client,
    url: String,
    size: u64,
    transferred_bytes: AtomicU64,
}

impl HttpRangeReader {
    /// Probe `url` with a HEAD request for its size and Range support.
    pub async fn new(url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::other)?;
        let size = probe(&client, &url).await?;
        log::debug!("remote archive {} is {} bytes", url, size);

        Ok(Self {
            client,
            url,
            size,
            transferred_bytes: AtomicU64::new(0),
        })
    }

    /// Total body bytes received so far, across all handles.
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }

    /// One ranged GET into `out`, retried on timeouts and connection failures.
    async fn fetch(&self, range: RangeInclusive<u64>, out: &mut [u8]) -> Result<usize> {
        let header = format!("bytes={}-{}", range.start(), range.end());
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match self.client.get(&self.url).header(RANGE, &header).send().await {
                Ok(resp) if resp.status() == StatusCode::PARTIAL_CONTENT => {
                    let body = resp.bytes().await.map_err(Error::other)?;
                    let n = body.len().min(out.len());
                    out[..n].copy_from_slice(&body[..n]);
                    return Ok(n);
                }
                Ok(resp) => {
                    return Err(Error::other(format!(
                        "range request {} answered with {}",
                        header,
                        resp.status()
                    )));
                }
                Err(e) if e.is_timeout() || e.is_connect() => e,
                Err(e) => return Err(Error::other(e)),
            };
            if attempt >= MAX_ATTEMPTS {
                return Err(Error::other(format!("giving up after {} attempts: {}", attempt, err)));
            }
            log::warn!("{}: attempt {}/{} failed: {}", self.url, attempt, MAX_ATTEMPTS, err);
            tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
        }
    }
}

async fn probe(client: &Client, url: &str) -> Result<u64> {
    let resp = client.head(url).send().await.map_err(Error::other)?;
    if !resp.status().is_success() {
        return Err(Error::other(format!("HEAD {} answered with {}", url, resp.status())));
    }

    let header = |name: HeaderName| resp.headers().get(name).and_then(|v| v.to_str().ok());
    if !header(ACCEPT_RANGES).is_some_and(|v| v.contains("bytes")) {
        return Err(Error::other("remote server does not support Range requests"));
    }
    header(CONTENT_LENGTH)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| Error::other("remote server did not return Content-Length"))
}

#[async_trait]
impl ReadAt for HttpRangeReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() || offset >= self.size {
            return Ok(0);
        }
        let len = (self.size - offset).min(buf.len() as u64) as usize;
        let end = offset + len as u64 - 1;

        // Servers may answer with a shorter range than asked; keep asking for the rest.
        let mut received = 0;
        while received < len {
            let n = self
                .fetch(offset + received as u64..=end, &mut buf[received..len])
                .await?;
            if n == 0 {
                break;
            }
            received += n;
            self.transferred_bytes.fetch_add(n as u64, Ordering::Relaxed);
        }
        Ok(received)
    }

    fn size(&self) -> u64 {
        self.size
    }
}
