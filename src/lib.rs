/*!
# chartsheet

Client layer for a spreadsheet charting service, built in Rust.

## Overview

Users upload Excel workbooks to a remote backend, which parses them and keeps
an upload history. This crate is everything on the client side of that
exchange: the signed-in session, role-gated navigation, a typed client for
the backend's REST API, and the chart derivation pipeline that turns a
parsed sheet plus a choice of columns into something drawable.

## Architecture

### Chart Derivation Pipeline
- **Axis Selection** - Sheet, X column, Y column and chart type (Bar, Line, Pie, 3DColumn)
- **Row Value Normalizer** - Parses raw cells into numbers, dropping rows that do not parse
- **Dataset Builder** - Labels, values and per-point colours for the 2D chart types
- **Option Builder** - Title, axes, legend and pie percentage labels
- **3D Series Adapter** - Column heights, positions, ticks and camera for the 3D view
- **Export Adapter** - PNG and single page PDF snapshots of 2D charts

All of this is synchronous and recomputed from scratch on every change.

### Session and Navigation
- **Session Context** - Current user and bearer token, persisted between runs
- **Route Guard** - Allow or redirect, per route, based on authentication and role

### Backend Contract
- **Backend** trait - Auth, upload, history, sheet/file deletion, AI summary, admin
- **HttpBackend** - reqwest implementation (feature `web`)

Every successful mutation is followed by a full re-fetch of the affected
collection; views never patch their local lists.

### Views
- **Upload**, **History**, **Analyze** and **Admin** screens as plain state
  structs driven by async methods

## Modules

- **selection**: chart types and axis selection state machine
- **normalize**: numeric parsing of raw cell values
- **dataset**: chart config and colour palettes
- **options**: chart display options
- **column3d**: 3D column scene
- **pipeline**: ties the above together
- **session**, **access**: signed-in state and route guard
- **backend**, **client**: backend contract and its HTTP implementation
- **auth**, **upload**, **history**, **analyze**, **admin**: screens
- **export**: PNG/PDF export
- **config**, **error**: configuration and error types
*/

pub mod access;
pub mod admin;
pub mod analyze;
pub mod auth;
pub mod backend;
pub mod column3d;
pub mod config;
pub mod dataset;
pub mod error;
pub mod history;
pub mod normalize;
pub mod options;
pub mod pipeline;
pub mod selection;
pub mod session;
pub mod sheet;
pub mod upload;

#[cfg(feature = "web")]
pub mod client;
#[cfg(feature = "web")]
pub mod export;

pub use access::{Access, Route, check_access};
pub use backend::Backend;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult, AuthError, ExportError};
pub use pipeline::{DerivedChart, derive_chart};
pub use selection::{AxisSelection, ChartType, SelectionState};
pub use session::{AppContext, AuthUser, Role};
pub use sheet::{FileData, FileSummary, Sheet};

#[cfg(feature = "web")]
pub use client::HttpBackend;
