//! Talking to the form server

// crate modules
use crate::error::{Error, Result};
use crate::page::url_encode;

// external crates
use log::debug;

/// Whatever submits forms and fetches result files
///
/// Each worker gets its own client, so implementations need not be shared
/// between threads.
pub trait FormClient {
    /// Post the form and return the page that comes back
    fn submit(&mut self, url: &str, form: &[(String, String)]) -> Result<String>;

    /// Fetch a result file
    fn fetch(&mut self, url: &str) -> Result<Vec<u8>>;
}

/// Plain HTTP client for the form server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClient {
    /// Seconds allowed for a submission, the calculation runs during it
    pub submit_timeout: u64,
    /// Seconds allowed for fetching a file
    pub fetch_timeout: u64,
}

impl HttpClient {
    pub fn new(submit_timeout: u64, fetch_timeout: u64) -> Self {
        Self {
            submit_timeout,
            fetch_timeout,
        }
    }
}

fn check_status(url: &str, response: &minreq::Response) -> Result<()> {
    match response.status_code {
        200..=299 => Ok(()),
        code => Err(Error::HttpStatus {
            url: url.to_string(),
            code,
            body: response.as_str().map(str::to_string).unwrap_or_default(),
        }),
    }
}

impl FormClient for HttpClient {
    fn submit(&mut self, url: &str, form: &[(String, String)]) -> Result<String> {
        debug!("Posting {} fields to {url}", form.len());
        let response = minreq::post(url)
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body(url_encode(form))
            .with_timeout(self.submit_timeout)
            .send()?;
        check_status(url, &response)?;
        Ok(response.as_str()?.to_string())
    }

    fn fetch(&mut self, url: &str) -> Result<Vec<u8>> {
        debug!("Fetching {url}");
        let response = minreq::get(url).with_timeout(self.fetch_timeout).send()?;
        check_status(url, &response)?;
        Ok(response.into_bytes())
    }
}
