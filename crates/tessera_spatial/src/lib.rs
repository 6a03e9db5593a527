//! # TESSERA Spatial
//!
//! Broad-phase spatial index for moving entities.
//!
//! ## Components
//!
//! - [`DynamicAabbTree`]: bounding volume hierarchy with fattened leaves
//! - [`ProxySync`]: world observer that mirrors entities into the tree
//! - [`Extent`]: half-size of an entity's bounds
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::{cell::RefCell, rc::Rc};
//! use tessera_spatial::{DynamicAabbTree, ProxySync, TreeConfig};
//!
//! let tree = Rc::new(RefCell::new(DynamicAabbTree::new(TreeConfig::default())));
//! ProxySync::attach(&mut world, Rc::clone(&tree));
//!
//! world.update(dt);
//! tree.borrow().query_tight(&region, |_, &entity| {
//!     println!("{entity}");
//!     true
//! });
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod sync;
pub mod tree;

pub use error::{SpatialError, SpatialResult};
pub use sync::{entity_bounds, Extent, ProxySync, SharedTree};
pub use tree::{DynamicAabbTree, ProxyId, TreeConfig, TreeStats};
