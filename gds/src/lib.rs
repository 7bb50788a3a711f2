// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! OPC UA Global Discovery Server certificate request provider backed by the
//! OPC vault service.

pub mod certificate_request;
pub mod client;
pub mod configuration;
pub mod constants;
pub mod errors;
pub mod models;
pub mod node_id;
pub mod status;
