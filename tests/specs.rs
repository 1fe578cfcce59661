// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level integration tests exercising the end-to-end scenarios
//! from spec.md §8 across crate boundaries. Per-crate unit tests live
//! alongside their source; these drive the cross-wiring fabric the way a
//! real emulated deployment would.

#[path = "specs/document_put_get.rs"]
mod document_put_get;
#[path = "specs/filter_evaluation.rs"]
mod filter_evaluation;
#[path = "specs/graph_topological_order.rs"]
mod graph_topological_order;
#[path = "specs/object_notification.rs"]
mod object_notification;
#[path = "specs/queue_event_source.rs"]
mod queue_event_source;
#[path = "specs/update_arithmetic.rs"]
mod update_arithmetic;
#[path = "specs/workflow_choice_dispatch.rs"]
mod workflow_choice_dispatch;
#[path = "specs/workflow_pass_succeed.rs"]
mod workflow_pass_succeed;
