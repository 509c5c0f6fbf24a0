//! Address table for one known build of the observed image
//!
//! Addresses are absolute, computed against the image's preferred load base.
//! Several catalogued locations are intentionally left unconfigured; resolving
//! one of those yields [`NotConfigured`] and the dependent feature is skipped.

use crate::core::types::{Address, NotConfigured};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Name of the build the built-in table describes
pub const KNOWN_BUILD: &str = "x86-reference";

/// Preferred load base of the 32-bit image
pub const PREFERRED_IMAGE_BASE: Address = Address::new(0x0040_0000);

/// Named logical locations in the observed image
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum Location {
    SnoGroupInitializers,
    SnoGroupByCode,
    SnoGroups,
    SnoGroupSearch,
    SnoFilesAsync,
    ObjectManager,
    ObjectManagerPristine,
    MessageDescriptor,
    MapActId,
    LocalData,
    LevelArea,
    LevelAreaName,
    GameplayPreferences,
    ContainerManager,
    BuffManager,
    ApplicationLoopCount,
    AttributeDescriptors,
    VideoPreferences,
    ChatPreferences,
    SoundPreferences,
    SocialPreferences,
    UiHandlers,
    UiReferences,
    SnoIdToEntityId,
    TrickleManager,
    PtrSnoFiles,
}

lazy_static! {
    static ref KNOWN_BUILD_TABLE: AddressTable = AddressTable::new(KNOWN_BUILD, PREFERRED_IMAGE_BASE)
        .with(Location::SnoGroupByCode, Address::new(0x01EA_73B0))
        .with(Location::SnoGroups, Address::new(0x01EA_3FE4))
        .with(Location::ObjectManager, Address::new(0x01EA_60D4))
        .with(Location::ObjectManagerPristine, Address::new(0x01EA_60D8))
        .with(Location::MessageDescriptor, Address::new(0x01F6_842C))
        .with(Location::MapActId, Address::new(0x01E3_0EE0))
        .with(Location::LocalData, Address::new(0x01EA_7378))
        .with(Location::LevelArea, Address::new(0x01E3_0B40))
        .with(Location::LevelAreaName, Address::new(0x01E3_0B70))
        .with(Location::ContainerManager, Address::new(0x01F6_7720))
        .with(Location::ApplicationLoopCount, Address::new(0x01EA_6148))
        .with(Location::AttributeDescriptors, Address::new(0x01EB_F028));
}

/// Immutable mapping from [`Location`] to [`Address`] for one image build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressTable {
    build: String,
    image_base: Address,
    entries: BTreeMap<Location, Address>,
}

impl AddressTable {
    /// Creates an empty table for the named build
    pub fn new(build: impl Into<String>, image_base: Address) -> Self {
        AddressTable {
            build: build.into(),
            image_base,
            entries: BTreeMap::new(),
        }
    }

    /// The table for the one build whose layout is known
    pub fn known_build() -> &'static AddressTable {
        &KNOWN_BUILD_TABLE
    }

    /// Adds an entry, builder style
    pub fn with(mut self, location: Location, address: Address) -> Self {
        self.insert(location, address);
        self
    }

    pub fn insert(&mut self, location: Location, address: Address) {
        self.entries.insert(location, address);
    }

    pub fn remove(&mut self, location: Location) -> Option<Address> {
        self.entries.remove(&location)
    }

    /// Looks up a location
    pub fn resolve(&self, location: Location) -> Result<Address, NotConfigured> {
        self.entries
            .get(&location)
            .copied()
            .ok_or(NotConfigured(location))
    }

    pub fn contains(&self, location: Location) -> bool {
        self.entries.contains_key(&location)
    }

    pub fn build(&self) -> &str {
        &self.build
    }

    pub fn image_base(&self) -> Address {
        self.image_base
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Location, Address)> + '_ {
        self.entries.iter().map(|(location, address)| (*location, *address))
    }

    /// Catalogued locations with no address in this table
    pub fn missing(&self) -> impl Iterator<Item = Location> + '_ {
        Location::iter().filter(|location| !self.contains(*location))
    }

    /// Rebases every entry for an image loaded at `actual_base`
    pub fn relocate(&self, actual_base: Address) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(location, address)| {
                let rva = address.as_usize().wrapping_sub(self.image_base.as_usize());
                (*location, actual_base + rva)
            })
            .collect();

        AddressTable {
            build: self.build.clone(),
            image_base: actual_base,
            entries,
        }
    }
}
