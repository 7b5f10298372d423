// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::model::{Entry, FileTree};

use super::{ExecKind, ExecutionGateway, ExecutionOutput, GatewayError, PersistenceGateway};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    code: &'a str,
}

/// Both gateways over the JSON HTTP service (`/filesystem`, `/execute/<kind>`).
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: String,
    client: Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| GatewayError::Connect {
                url: base_url.clone(),
                message: err.to_string(),
            })?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn filesystem_url(&self) -> String {
        self.url("/filesystem")
    }
}

fn send(request: RequestBuilder, url: &str) -> Result<Response, GatewayError> {
    let response = request
        .send()
        .map_err(|err| GatewayError::Connect { url: url.to_owned(), message: err.to_string() })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.json::<ErrorBody>().ok().and_then(|body| body.error);
    Err(GatewayError::Status { url: url.to_owned(), status: status.as_u16(), message })
}

fn decode<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, GatewayError> {
    response
        .json::<T>()
        .map_err(|err| GatewayError::Decode { url: url.to_owned(), message: err.to_string() })
}

impl PersistenceGateway for HttpGateway {
    fn load(&self) -> Result<FileTree, GatewayError> {
        let url = self.filesystem_url();
        let response = send(self.client.get(&url), &url)?;
        let entries = decode::<Vec<Entry>>(response, &url)?;
        FileTree::from_entries(entries)
            .map_err(|err| GatewayError::Decode { url, message: err.to_string() })
    }

    fn save(&self, tree: &FileTree) -> Result<(), GatewayError> {
        let url = self.filesystem_url();
        send(self.client.post(&url).json(tree), &url)?;
        tracing::debug!(url = %url, entries = tree.entry_count(), "tree saved");
        Ok(())
    }

    fn send_best_effort(&self, tree: &FileTree) {
        let url = self.filesystem_url();
        let body = match serde_json::to_vec(tree) {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(error = %err, "cannot encode tree for exit save");
                return;
            }
        };
        let request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        let spawned = std::thread::Builder::new().name("arbor-exit-save".to_owned()).spawn(
            move || match request.send() {
                Ok(response) => {
                    tracing::debug!(url = %url, status = %response.status(), "exit save sent")
                }
                Err(err) => tracing::debug!(url = %url, error = %err, "exit save failed"),
            },
        );
        if let Err(err) = spawned {
            tracing::warn!(error = %err, "cannot spawn exit save thread");
        }
    }
}

impl ExecutionGateway for HttpGateway {
    fn execute(&self, kind: ExecKind, code: &str) -> Result<ExecutionOutput, GatewayError> {
        let url = self.url(&format!("/execute/{kind}"));
        let response = send(self.client.post(&url).json(&ExecuteRequest { code }), &url)?;
        decode::<ExecutionOutput>(response, &url)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::HttpGateway;
    use crate::gateway::{GatewayError, PersistenceGateway};

    #[rstest]
    #[case("http://localhost:5001", "http://localhost:5001/filesystem")]
    #[case("http://localhost:5001/", "http://localhost:5001/filesystem")]
    #[case("http://host/api//", "http://host/api/filesystem")]
    fn base_url_is_normalized(#[case] base: &str, #[case] expected: &str) {
        let gateway = HttpGateway::new(base).expect("client");
        assert_eq!(gateway.filesystem_url(), expected);
    }

    #[test]
    fn unreachable_service_is_a_connect_error() {
        // Port 9 (discard) is closed on loopback in practice.
        let gateway = HttpGateway::new("http://127.0.0.1:9").expect("client");
        let err = gateway.load().unwrap_err();
        assert!(matches!(err, GatewayError::Connect { .. }), "{err:?}");
    }
}
