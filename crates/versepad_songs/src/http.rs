//! HTTP implementation of the remote backend contract.
//!
//! Talks to a document API exposing `/songs` CRUD and `/audio` blob
//! endpoints. The bearer token is opaque: it is attached when present and a
//! 401 is reported as [`SongError::NotAuthenticated`], never refreshed here.

use std::time::Duration;

use parking_lot::Mutex;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{SongError, SongResult};
use crate::model::SongRecord;
use crate::remote::RemoteStore;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpRemote {
    client: Client,
    base_url: String,
    token: Mutex<Option<String>>,
}

#[derive(Deserialize)]
struct CreatedResponse {
    id: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>) -> SongResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SongError::Remote(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        })
    }

    pub fn with_token(base_url: impl Into<String>, token: impl Into<String>) -> SongResult<Self> {
        let remote = Self::new(base_url)?;
        remote.set_token(Some(token.into()));
        Ok(remote)
    }

    /// Replaces the bearer credential; `None` signs out.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.lock() = token;
    }

    fn songs_url(&self) -> String {
        format!("{}/songs", self.base_url)
    }

    fn song_url(&self, id: &str) -> String {
        format!("{}/songs/{}", self.base_url, id)
    }

    fn audio_url(&self) -> String {
        format!("{}/audio", self.base_url)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token.lock().as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn send(&self, builder: RequestBuilder) -> SongResult<Response> {
        let response = self
            .authed(builder)
            .send()
            .map_err(|e| SongError::Remote(e.to_string()))?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(SongError::NotAuthenticated);
        }
        if !response.status().is_success() {
            return Err(SongError::Remote(format!("HTTP {}", response.status())));
        }
        Ok(response)
    }
}

impl RemoteStore for HttpRemote {
    fn is_authenticated(&self) -> bool {
        self.token.lock().is_some()
    }

    fn list(&self) -> SongResult<Vec<SongRecord>> {
        self.send(self.client.get(self.songs_url()))?
            .json()
            .map_err(|e| SongError::Remote(e.to_string()))
    }

    fn get(&self, id: &str) -> SongResult<SongRecord> {
        self.send(self.client.get(self.song_url(id)))?
            .json()
            .map_err(|e| SongError::Remote(e.to_string()))
    }

    fn create(&self, song: &SongRecord) -> SongResult<String> {
        let created: CreatedResponse = self
            .send(self.client.post(self.songs_url()).json(song))?
            .json()
            .map_err(|e| SongError::Remote(e.to_string()))?;
        Ok(created.id)
    }

    fn update(&self, id: &str, song: &SongRecord) -> SongResult<()> {
        self.send(self.client.put(self.song_url(id)).json(song))?;
        Ok(())
    }

    fn delete(&self, id: &str) -> SongResult<()> {
        self.send(self.client.delete(self.song_url(id)))?;
        Ok(())
    }

    fn upload_audio(&self, file_name: &str, bytes: &[u8]) -> SongResult<String> {
        let uploaded: UploadResponse = self
            .send(
                self.client
                    .post(self.audio_url())
                    .header("x-file-name", file_name)
                    .body(bytes.to_vec()),
            )?
            .json()
            .map_err(|e| SongError::Remote(e.to_string()))?;
        Ok(uploaded.url)
    }

    fn download_audio(&self, url: &str) -> SongResult<Vec<u8>> {
        let response = self.send(self.client.get(url))?;
        let bytes = response
            .bytes()
            .map_err(|e| SongError::Remote(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn delete_audio(&self, url: &str) -> SongResult<()> {
        self.send(self.client.delete(self.audio_url()).query(&[("url", url)]))?;
        Ok(())
    }
}
