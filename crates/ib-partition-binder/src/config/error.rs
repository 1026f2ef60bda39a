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

use std::path::PathBuf;

use thiserror::Error;

// ConfigError is returned when the binder configuration can't be
// loaded. All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    // InvalidValue is returned when an option holds a value that
    // can't be resolved, like an unparsable verify_ca or a partition
    // key outside (0x0, 0x7fff).
    #[error("Invalid value \"{value}\" was set to configuration option: {option}. {details}")]
    InvalidValue {
        option: String,
        value: String,
        details: String,
    },

    // Io is returned when the configuration file can't be read.
    #[error("Failed to read configuration file {}: {error}", .path.display())]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },

    // Parse is returned when the configuration isn't valid TOML or
    // doesn't match the expected layout.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn invalid_value(
        option: impl Into<String>,
        value: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidValue {
            option: option.into(),
            value: value.into(),
            details: details.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
