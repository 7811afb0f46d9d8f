// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Optimistic message sending for Classline rooms.
//!
//! [`OptimisticSendCoordinator::send`] inserts a pending placeholder into a
//! [`MessageView`], calls the message endpoint, and replaces the
//! placeholder with the moderation outcome:
//!
//! | server status           | placeholder becomes            | `send` returns              |
//! |-------------------------|--------------------------------|-----------------------------|
//! | `allow`                 | `Confirmed { flagged: false }` | `Ok(SendReceipt)`           |
//! | `flag`                  | `Confirmed { flagged: true }`  | `Ok(SendReceipt)`           |
//! | `block`                 | `Failed`                       | `Err(Rejected)`             |
//! | `requires_confirmation` | `Failed`                       | `Err(AmbiguousOutcome)`     |
//! | network / parse error   | `Failed`                       | `Err(Transport)`            |

pub mod coordinator;
pub mod error;
pub mod http;
pub mod message;
pub mod timeline;

pub use coordinator::OptimisticSendCoordinator;
pub use error::SendError;
pub use http::HttpMessageEndpoint;
pub use message::{
    MessageDraft, MessageStatus, OptimisticMessage, Resolution, SendReceipt, StatusKind,
};
pub use timeline::{MessageTimeline, MessageView};
