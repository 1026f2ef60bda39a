/*
 * SPDX-FileCopyrightText: Copyright (c) 2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: Apache-2.0
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

// src/ufm/error.rs
// Defines errors for talking to the UFM REST API, classified by the
// HTTP status UFM answers with.

use thiserror::Error;

// UfmError is the error type for every UFM partition key call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UfmError {
    // BadRequest is returned when UFM answers 400.
    #[error("HTTP {method} {url} returned code 400. {body}")]
    BadRequest {
        method: String,
        url: String,
        body: String,
    },

    // AccessDenied is returned when UFM answers 401 or 403.
    #[error("HTTP {method} {url} returned code {status}. {body}")]
    AccessDenied {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    // NotFound is returned when UFM answers 404, which is how it
    // reports a missing partition key or member.
    #[error("Resource {url} not found")]
    NotFound { method: String, url: String },

    // ServerError is returned for any 5xx answer.
    #[error("HTTP {method} {url} returned code {status}. {body}")]
    ServerError {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    // HttpError is returned for any other error status.
    #[error("HTTP {method} {url} returned code {status}. {body}")]
    HttpError {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    // ConnectionError is returned when no response came back at all:
    // refused connections, TLS failures, timeouts.
    #[error("Unable to connect to {url}. Error: {error}")]
    ConnectionError { url: String, error: String },

    // InvalidResponse is returned when a successful response body
    // can't be decoded.
    #[error("Invalid response from {url}: {error}")]
    InvalidResponse { url: String, error: String },

    // ClientSetup is returned when the HTTP client can't be built,
    // such as for an unparsable endpoint or unreadable CA bundle.
    #[error("Failed to set up UFM client: {0}")]
    ClientSetup(String),

    // InvalidPartitionKey is returned when a value isn't a partition
    // key in the open range (0x0, 0x7fff).
    #[error("Invalid partition key '{0}': expected a value between 0x0 and 0x7fff exclusive")]
    InvalidPartitionKey(String),
}

impl UfmError {
    // from_response classifies a response status. Statuses below 400
    // are not errors and yield None.
    pub fn from_response(method: &str, url: &str, status: u16, body: impl Into<String>) -> Option<Self> {
        let method = method.to_string();
        let url = url.to_string();
        let body = body.into();
        match status {
            0..=399 => None,
            404 => Some(UfmError::NotFound { method, url }),
            400 => Some(UfmError::BadRequest { method, url, body }),
            401 | 403 => Some(UfmError::AccessDenied {
                method,
                url,
                status,
                body,
            }),
            500.. => Some(UfmError::ServerError {
                method,
                url,
                status,
                body,
            }),
            _ => Some(UfmError::HttpError {
                method,
                url,
                status,
                body,
            }),
        }
    }

    // is_not_found is true for the one error removals treat as success.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UfmError::NotFound { .. })
    }

    // status returns the HTTP status behind the error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            UfmError::BadRequest { .. } => Some(400),
            UfmError::NotFound { .. } => Some(404),
            UfmError::AccessDenied { status, .. }
            | UfmError::ServerError { status, .. }
            | UfmError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type UfmResult<T> = Result<T, UfmError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(status: u16) -> Option<UfmError> {
        UfmError::from_response("DELETE", "https://ufm/ufmRest/resources/pkeys/0x3e7e", status, "")
    }

    #[test]
    fn test_success_is_not_an_error() {
        assert!(classify(200).is_none());
        assert!(classify(204).is_none());
        assert!(classify(302).is_none());
    }

    #[test]
    fn test_classification() {
        assert!(classify(404).unwrap().is_not_found());
        assert!(matches!(classify(400), Some(UfmError::BadRequest { .. })));
        assert!(matches!(classify(401), Some(UfmError::AccessDenied { status: 401, .. })));
        assert!(matches!(classify(403), Some(UfmError::AccessDenied { status: 403, .. })));
        assert!(matches!(classify(500), Some(UfmError::ServerError { status: 500, .. })));
        assert!(matches!(classify(503), Some(UfmError::ServerError { status: 503, .. })));
        assert!(matches!(classify(409), Some(UfmError::HttpError { status: 409, .. })));
        assert_eq!(classify(409).unwrap().status(), Some(409));
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            classify(404).unwrap().to_string(),
            "Resource https://ufm/ufmRest/resources/pkeys/0x3e7e not found"
        );
    }
}
