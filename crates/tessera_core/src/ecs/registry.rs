//! # Component Registry
//!
//! Data-driven construction of components and entities.
//!
//! Component kinds are registered once with their id, name and a default
//! constructor. Templates are named lists of component kinds; spawning a
//! template creates an entity holding a default instance of each.
//!
//! The registry is an ordinary value owned by whoever loads content. There is
//! no global table.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use tessera_shared::MAX_COMPONENT_TYPES;
use tracing::debug;

use super::component::{Component, ComponentTypeId};
use super::entity::Entity;
use super::world::World;
use crate::error::{EcsError, EcsResult};

/// Everything known about one registered component kind.
#[derive(Clone, Copy)]
struct ComponentInfo {
    name: &'static str,
    rust_type: TypeId,
    construct: fn() -> Box<dyn Any>,
}

fn construct_default<C: Component + Default>() -> Box<dyn Any> {
    Box::new(C::default())
}

/// Registry of component kinds and entity templates.
pub struct ComponentRegistry {
    by_id: Vec<Option<ComponentInfo>>,
    by_name: HashMap<&'static str, ComponentTypeId>,
    templates: HashMap<String, Vec<ComponentTypeId>>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_id: vec![None; MAX_COMPONENT_TYPES],
            by_name: HashMap::new(),
            templates: HashMap::new(),
        }
    }

    /// Registers `C`.
    ///
    /// Registering the same type twice is a no-op.
    ///
    /// # Errors
    ///
    /// [`EcsError::DuplicateComponentId`] if another type already holds
    /// `C::ID`, [`EcsError::DuplicateComponentName`] if another type already
    /// holds `C::NAME`.
    pub fn register<C: Component + Default>(&mut self) -> EcsResult<()> {
        let id = C::TYPE_ID;
        let rust_type = TypeId::of::<C>();

        if let Some(existing) = &self.by_id[id.index()] {
            if existing.rust_type == rust_type {
                return Ok(());
            }
            return Err(EcsError::DuplicateComponentId {
                id,
                existing: existing.name,
                incoming: C::NAME,
            });
        }
        if let Some(&existing) = self.by_name.get(C::NAME) {
            return Err(EcsError::DuplicateComponentName {
                name: C::NAME,
                existing,
                incoming: id,
            });
        }

        self.by_id[id.index()] = Some(ComponentInfo {
            name: C::NAME,
            rust_type,
            construct: construct_default::<C>,
        });
        self.by_name.insert(C::NAME, id);
        debug!(component = C::NAME, %id, "component registered");
        Ok(())
    }

    /// Number of registered component kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Id registered under `name`.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<ComponentTypeId> {
        self.by_name.get(name).copied()
    }

    /// Name registered under `id`.
    #[must_use]
    pub fn name_of(&self, id: ComponentTypeId) -> Option<&'static str> {
        self.by_id[id.index()].map(|info| info.name)
    }

    /// Default instance of the kind registered under `id`.
    #[must_use]
    pub fn construct(&self, id: ComponentTypeId) -> Option<Box<dyn Any>> {
        self.by_id[id.index()].map(|info| (info.construct)())
    }

    /// Adds a default instance of the kind named `name` to `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownComponent`] if nothing is registered under `name`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not valid in `world`.
    pub fn add_by_name(&self, world: &mut World, entity: Entity, name: &str) -> EcsResult<()> {
        let id = self
            .id_of(name)
            .ok_or_else(|| EcsError::UnknownComponent(name.to_owned()))?;
        self.add_by_id(world, entity, id);
        Ok(())
    }

    fn add_by_id(&self, world: &mut World, entity: Entity, id: ComponentTypeId) {
        if let Some(component) = self.construct(id) {
            world.add_component_boxed(entity, id, component);
        }
    }

    // =========================================================================
    // Templates
    // =========================================================================

    /// Defines (or redefines) a template from component names.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownComponent`] naming the first unregistered component;
    /// the template is left untouched in that case.
    pub fn define_template(&mut self, template: &str, components: &[&str]) -> EcsResult<()> {
        let ids = components
            .iter()
            .map(|name| {
                self.id_of(name)
                    .ok_or_else(|| EcsError::UnknownComponent((*name).to_owned()))
            })
            .collect::<EcsResult<Vec<_>>>()?;

        debug!(template, components = ids.len(), "template defined");
        self.templates.insert(template.to_owned(), ids);
        Ok(())
    }

    /// Checks whether a template exists.
    #[must_use]
    pub fn has_template(&self, template: &str) -> bool {
        self.templates.contains_key(template)
    }

    /// Creates an entity holding a default instance of every component the
    /// template lists. The entity starts disabled like any other.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownTemplate`] if no template has that name; no entity
    /// is created in that case.
    pub fn spawn(&self, world: &mut World, template: &str) -> EcsResult<Entity> {
        let ids = self
            .templates
            .get(template)
            .ok_or_else(|| EcsError::UnknownTemplate(template.to_owned()))?;

        let entity = world.create_entity();
        for &id in ids {
            self.add_by_id(world, entity, id);
        }
        Ok(entity)
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Position, Velocity};

    #[derive(Default)]
    struct Impostor;
    impl Component for Impostor {
        const ID: u8 = 0;
        const NAME: &'static str = "impostor";
    }

    #[derive(Default)]
    struct NameThief;
    impl Component for NameThief {
        const ID: u8 = 50;
        const NAME: &'static str = "position";
    }

    fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.register::<Position>().unwrap();
        registry.register::<Velocity>().unwrap();
        registry
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.id_of("velocity"), Some(Velocity::TYPE_ID));
        assert_eq!(registry.name_of(Position::TYPE_ID), Some("position"));

        let boxed = registry.construct(Velocity::TYPE_ID).unwrap();
        assert_eq!(boxed.downcast_ref::<Velocity>(), Some(&Velocity::default()));
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let mut registry = registry();
        assert!(registry.register::<Position>().is_ok());
        assert_eq!(
            registry.register::<Impostor>(),
            Err(EcsError::DuplicateComponentId {
                id: Position::TYPE_ID,
                existing: "position",
                incoming: "impostor",
            })
        );
        assert!(matches!(
            registry.register::<NameThief>(),
            Err(EcsError::DuplicateComponentName { name: "position", .. })
        ));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_template_spawn() {
        let mut registry = registry();
        registry
            .define_template("mover", &["position", "velocity"])
            .unwrap();

        let mut world = World::new();
        let e = registry.spawn(&mut world, "mover").unwrap();

        assert!(world.has_component::<Position>(e));
        assert!(world.has_component::<Velocity>(e));
        assert!(!world.is_enabled(e));
    }

    #[test]
    fn test_unknown_names() {
        let mut registry = registry();
        assert_eq!(
            registry.define_template("bad", &["position", "mass"]),
            Err(EcsError::UnknownComponent("mass".into()))
        );
        assert!(!registry.has_template("bad"));

        let mut world = World::new();
        assert_eq!(
            registry.spawn(&mut world, "ghost"),
            Err(EcsError::UnknownTemplate("ghost".into()))
        );
        assert_eq!(world.entity_count(), 0);

        let e = world.create_entity();
        assert!(registry.add_by_name(&mut world, e, "mass").is_err());
        registry.add_by_name(&mut world, e, "position").unwrap();
        assert_eq!(world.component::<Position>(e), Some(&Position::default()));
    }
}
