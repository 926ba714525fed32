//! Typed AST-based DSL for per-batch event selection.
//!
//! This crate provides a lazy, type-safe embedded DSL for expressing event
//! selections as masks over a columnar batch. The design uses trait-based
//! extensibility, allowing new node types to be defined without modifying the
//! core infrastructure.
//!
//! # Example
//!
//! ```ignore
//! use hinv_pipeline::{PipelineContext, Engine};
//! use hinv_pipeline::ops::{AllEvents, ScalarColumn};
//!
//! let ctx = Arc::new(PipelineContext::new());
//! let all = AllEvents::new(&ctx);
//! let met_cut = ScalarColumn::new(&ctx, "MET").gt(100.0);
//! let sr = &all & &met_cut;
//!
//! // Lazy evaluation - nothing runs until a batch is bound to an engine
//! let mut engine = Engine::new(ctx.clone(), &batch);
//! let passing = engine.eval(&sr)?;
//! ```

pub mod context;
pub mod engine;
pub mod expr;
pub mod node;
pub mod ops;
pub mod storage;
pub mod value;

pub use context::PipelineContext;
pub use engine::{Engine, EvalContext};
pub use expr::Expr;
pub use node::{AnyNode, Node, NodeId};
pub use storage::NodeStorage;
pub use value::{Column, ExprValue, Mask, Objects, OptColumn, mask_count, masked_sum};
