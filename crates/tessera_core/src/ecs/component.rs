//! # Component System
//!
//! Components are plain data attached to entities. Each component kind
//! declares a stable small integer id; the id indexes the per-entity slot
//! array and selects the bit in the entity's [`ComponentsFilter`].

use std::any::Any;
use std::fmt;

use bytemuck::{Pod, Zeroable};
use tessera_shared::MAX_COMPONENT_TYPES;

/// Stable identifier of a component kind, always below [`MAX_COMPONENT_TYPES`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ComponentTypeId(u8);

impl ComponentTypeId {
    /// Creates an id, failing const evaluation when it is out of range.
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a const context) if
    /// `id >= MAX_COMPONENT_TYPES`.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        assert!(
            (id as usize) < MAX_COMPONENT_TYPES,
            "component id must be below MAX_COMPONENT_TYPES"
        );
        Self(id)
    }

    /// Id of a component type.
    #[inline]
    #[must_use]
    pub const fn of<C: Component>() -> Self {
        C::TYPE_ID
    }

    /// Index into slot arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw id.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Marker trait for ECS components.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct Health(u32);
///
/// impl Component for Health {
///     const ID: u8 = 7;
///     const NAME: &'static str = "health";
/// }
/// ```
///
/// An `ID` of [`MAX_COMPONENT_TYPES`] or more is rejected when the component
/// is first used, not at run time.
pub trait Component: Any {
    /// Unique identifier for this component type (0-63).
    const ID: u8;

    /// Name used by data-driven construction.
    const NAME: &'static str;

    /// Checked form of [`ID`](Self::ID); evaluation fails for out-of-range ids.
    const TYPE_ID: ComponentTypeId = ComponentTypeId::new(Self::ID);
}

/// Bit set of component types held by an entity.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct ComponentsFilter(u64);

impl ComponentsFilter {
    /// Filter with no bits set.
    pub const EMPTY: Self = Self(0);

    /// Filter with the single bit of `C`.
    #[inline]
    #[must_use]
    pub const fn of<C: Component>() -> Self {
        Self::EMPTY.with::<C>()
    }

    /// Returns this filter with the bit of `C` added.
    #[inline]
    #[must_use]
    pub const fn with<C: Component>(self) -> Self {
        self.with_id(C::TYPE_ID)
    }

    /// Returns this filter with the bit of `id` added.
    #[inline]
    #[must_use]
    pub const fn with_id(self, id: ComponentTypeId) -> Self {
        Self(self.0 | (1 << id.0))
    }

    /// Sets the bit of `id`.
    #[inline]
    pub fn insert(&mut self, id: ComponentTypeId) {
        self.0 |= 1 << id.0;
    }

    /// Clears the bit of `id`.
    #[inline]
    pub fn remove(&mut self, id: ComponentTypeId) {
        self.0 &= !(1 << id.0);
    }

    /// Checks the bit of `id`.
    #[inline]
    #[must_use]
    pub const fn contains(self, id: ComponentTypeId) -> bool {
        self.0 & (1 << id.0) != 0
    }

    /// True when every bit of `required` is also set here.
    #[inline]
    #[must_use]
    pub const fn contains_all(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// True when no bit is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of set bits.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Clears every bit.
    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Iterates over the set ids in ascending order.
    pub fn iter(self) -> impl Iterator<Item = ComponentTypeId> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let id = bits.trailing_zeros() as u8;
            bits &= bits - 1;
            Some(ComponentTypeId(id))
        })
    }
}

impl fmt::Debug for ComponentsFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentsFilter({:#066b})", self.0)
    }
}
