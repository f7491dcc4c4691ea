use num_traits::{One, PrimInt};

/// The primitive storage behind every `LayerMask`.
pub type FlagsContainer = u32;

/// Trait implemented by flag enums declared with [`define_surface_layers!`].
///
/// The enum's discriminant (via `#[repr(u8)]`) determines the bit index.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // NOTE: `bit_index()` must be < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// Plain bit container shared by the typed masks.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new(bits: T) -> Self {
        Self { bits }
    }

    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits | tag.mask();
    }

    pub fn remove<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits & !tag.mask();
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, tag: U) -> bool {
        (self.bits & tag.mask()) != T::zero()
    }

    pub fn add_many<U: FlagBitmask<Storage = T> + Copy>(&mut self, tags: &[U]) {
        for &tag in tags {
            self.add(tag);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bits == T::zero()
    }
}

/// Declare a surface-layer enum and implement `FlagBitmask` for it.
///
/// Also generates `ALL` (every variant in declaration order) and `from_index`.
#[macro_export]
macro_rules! define_surface_layers {
    ($name:ident, $storage:ty, { $($variant:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// Inverse of `bit_index`, e.g. for layers stored in collider user data.
            pub fn from_index(index: u8) -> Option<Self> {
                Self::ALL.get(index as usize).copied()
            }
        }

        impl $crate::layers::FlagBitmask for $name {
            type Storage = $storage;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
}

define_surface_layers!(SurfaceLayer, FlagsContainer, {
    Default,
    // Decorative geometry the ground probe should skip.
    Detailed,
    // Steps and ramps that use the relaxed stairs slope.
    Stairs,
    Agent,
    Obstruction,
});

impl Default for SurfaceLayer {
    fn default() -> Self {
        SurfaceLayer::Default
    }
}

/// A set of surface layers used to filter queries and classify contacts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LayerMask(BitmaskFlags<FlagsContainer>);

impl LayerMask {
    /// Every layer, including ones declared later.
    pub fn all() -> Self {
        Self(BitmaskFlags::new(FlagsContainer::MAX))
    }

    pub fn none() -> Self {
        Self(BitmaskFlags::default())
    }

    pub fn only(layers: &[SurfaceLayer]) -> Self {
        let mut flags = BitmaskFlags::default();
        flags.add_many(layers);
        Self(flags)
    }

    #[must_use]
    pub fn with(mut self, layer: SurfaceLayer) -> Self {
        self.0.add(layer);
        self
    }

    #[must_use]
    pub fn without(mut self, layer: SurfaceLayer) -> Self {
        self.0.remove(layer);
        self
    }

    #[inline]
    pub fn contains(&self, layer: SurfaceLayer) -> bool {
        self.0.has(layer)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Declared layers that are members of this set.
    pub fn layers(&self) -> impl Iterator<Item = SurfaceLayer> + '_ {
        SurfaceLayer::ALL.iter().copied().filter(|l| self.contains(*l))
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<SurfaceLayer> for LayerMask {
    fn from_iter<I: IntoIterator<Item = SurfaceLayer>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), LayerMask::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_contains_every_declared_layer() {
        let mask = LayerMask::all();
        for layer in SurfaceLayer::ALL {
            assert!(mask.contains(*layer));
        }
        assert!(LayerMask::none().is_empty());
    }

    #[test]
    fn only_and_without_are_exact() {
        let stairs = LayerMask::only(&[SurfaceLayer::Stairs]);
        assert!(stairs.contains(SurfaceLayer::Stairs));
        assert!(!stairs.contains(SurfaceLayer::Default));

        let probe = LayerMask::all().without(SurfaceLayer::Detailed);
        assert!(!probe.contains(SurfaceLayer::Detailed));
        assert!(probe.contains(SurfaceLayer::Stairs));
    }

    #[test]
    fn layers_iterates_members_in_declaration_order() {
        let mask: LayerMask = [SurfaceLayer::Agent, SurfaceLayer::Default]
            .into_iter()
            .collect();
        let listed: Vec<_> = mask.layers().collect();
        assert_eq!(listed, vec![SurfaceLayer::Default, SurfaceLayer::Agent]);
    }

    #[test]
    fn from_index_inverts_bit_index() {
        for layer in SurfaceLayer::ALL {
            assert_eq!(SurfaceLayer::from_index(layer.bit_index()), Some(*layer));
        }
        assert_eq!(SurfaceLayer::from_index(200), None);
    }
}
