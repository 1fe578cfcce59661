// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workflow provider: `lc_workflow::WorkflowEngine` wrapped with the
//! `Provider` lifecycle and a compute bridge wired directly against a
//! `ComputeFunctionProvider`.

mod provider;

pub use provider::WorkflowProvider;
