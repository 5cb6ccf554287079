/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AddrError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("no such device: {0}")]
    NoSuchDevice(String),
    #[error("address not available")]
    AddressNotAvailable,
    #[error("timed out")]
    Timeout,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl AddrError {
    pub fn get_type(&self) -> &'static str {
        match self {
            AddrError::InvalidArgument(_) => "InvalidArgument",
            AddrError::NoSuchDevice(_) => "NoSuchDevice",
            AddrError::AddressNotAvailable => "AddressNotAvailable",
            AddrError::Timeout => "Timeout",
            AddrError::Io(_) => "IoError",
        }
    }
}
