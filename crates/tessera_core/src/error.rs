//! # Kernel Error Types
//!
//! All errors that can occur in the entity kernel.

use thiserror::Error;

use crate::ecs::{ComponentTypeId, Entity};

/// Errors that can occur in the entity kernel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// A stale, foreign or null handle was passed where a live entity is required.
    #[error("invalid entity handle {0}")]
    InvalidEntity(Entity),

    /// The entity does not hold the requested component.
    #[error("entity {entity} has no {component} component")]
    ComponentAbsent {
        /// Entity that was queried.
        entity: Entity,
        /// Name of the missing component type.
        component: &'static str,
    },

    /// Two component kinds declared the same id.
    #[error("component id {id} is claimed by both {existing} and {incoming}")]
    DuplicateComponentId {
        /// Contested id.
        id: ComponentTypeId,
        /// Name already registered under the id.
        existing: &'static str,
        /// Name that tried to register.
        incoming: &'static str,
    },

    /// Two component kinds declared the same name.
    #[error("component name {name:?} is claimed by both {existing} and {incoming}")]
    DuplicateComponentName {
        /// Contested name.
        name: &'static str,
        /// Id already registered under the name.
        existing: ComponentTypeId,
        /// Id that tried to register.
        incoming: ComponentTypeId,
    },

    /// No component kind is registered under this name.
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    /// No entity template is registered under this name.
    #[error("unknown entity template: {0}")]
    UnknownTemplate(String),
}

/// Result type for kernel operations.
pub type EcsResult<T> = Result<T, EcsError>;
