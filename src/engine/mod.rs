//! Per-tick synchronization with the foreign process
//!
//! One call to [`Engine::update`] checks whether the client is in a game,
//! compares the foreign frame counter with the last processed frame, and on
//! a new frame re-reads local data and the entity table. Both are published
//! together only when every required read succeeded. The mesh is rebuilt on
//! its own wall-clock cooldown during in-game ticks.

pub mod frame;
pub mod health;
pub mod publish;
pub mod snapshot;

pub use frame::FrameDetector;
pub use health::{FailureTracker, Health};
pub use publish::{EngineView, Published, WorldState};
pub use snapshot::{EntitySnapshot, TableLayout, TableStorage};

use crate::address::{AddressTable, Location};
use crate::core::types::{
    Address, ChainError, FrameCounter, MeshError, NotConfigured, ReadFault, TickError,
};
use crate::game::{LocalData, LocalDataHeader, ObjectLayout};
use crate::memory::{FieldRef, MemoryReader, PointerWidth, ReadMemory};
use crate::mesh::{read_geometry, CellMeshBuilder, MeshBuilder, MeshScheduler};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new frame was observed and fully published
    Refreshed { frame: FrameCounter },
    /// Same frame as the last published one
    Unchanged,
    /// The client is not in a game; nothing was read past the context check
    OutOfContext,
    /// The tick was abandoned; previously published state is untouched
    Failed(TickError),
}

/// Tunables of an [`Engine`]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub pointer_width: PointerWidth,
    /// Upper bound on records copied per snapshot
    pub entity_capacity: usize,
    pub mesh_cooldown: Duration,
    /// Consecutive failed ticks before health turns persistent
    pub failure_threshold: u32,
    pub max_geometry_bytes: usize,
    pub layout: ObjectLayout,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            pointer_width: PointerWidth::Bits32,
            entity_capacity: 8192,
            mesh_cooldown: Duration::from_millis(3000),
            failure_threshold: 50,
            max_geometry_bytes: 16 * 1024 * 1024,
            layout: ObjectLayout::default(),
        }
    }
}

/// Locations already reported as missing, so each is logged once
#[derive(Debug, Default)]
struct MissingLocations(BTreeSet<Location>);

impl MissingLocations {
    fn note(&mut self, missing: NotConfigured, feature: &'static str) {
        let NotConfigured(location) = missing;
        if self.0.insert(location) {
            warn!(%location, feature, "location not configured for this build; feature unavailable");
        }
    }

    fn check(&mut self, error: ChainError, feature: &'static str) -> ChainError {
        if let ChainError::NotConfigured(missing) = error {
            self.note(missing, feature);
        }
        error
    }
}

/// Reads an optional field; any failure leaves it unset
fn optional<T>(
    missing: &mut MissingLocations,
    feature: &'static str,
    read: impl FnOnce() -> Result<T, TickError>,
) -> Option<T> {
    match read() {
        Ok(value) => Some(value),
        Err(TickError::NotConfigured(location)) => {
            missing.note(location, feature);
            None
        }
        Err(error) => {
            trace!(feature, %error, "optional field unavailable this frame");
            None
        }
    }
}

/// Mirrors the live state of one foreign process.
///
/// The memory source and address table are borrowed and must outlive the
/// engine. Published state is reachable from other threads through
/// [`Engine::subscribe`].
pub struct Engine<'a, M: ReadMemory + ?Sized, B: MeshBuilder = CellMeshBuilder> {
    reader: MemoryReader<'a, M>,
    table: &'a AddressTable,
    settings: EngineSettings,
    builder: B,
    frames: FrameDetector,
    scheduler: MeshScheduler,
    health: FailureTracker,
    counter_address: Option<Address>,
    world: Published<WorldState>,
    mesh: Published<B::Mesh>,
    mesh_generation: u64,
    missing: MissingLocations,
}

impl<'a, M: ReadMemory + ?Sized, B: MeshBuilder> Engine<'a, M, B> {
    pub fn new(source: &'a M, table: &'a AddressTable, settings: EngineSettings, builder: B) -> Self {
        info!(
            build = table.build(),
            image_base = %table.image_base(),
            capacity = settings.entity_capacity,
            "engine created"
        );

        Engine {
            reader: MemoryReader::new(source, settings.pointer_width),
            table,
            scheduler: MeshScheduler::new(settings.mesh_cooldown),
            health: FailureTracker::new(settings.failure_threshold),
            settings,
            builder,
            frames: FrameDetector::new(),
            counter_address: None,
            world: Published::new(WorldState::default()),
            mesh: Published::new(B::Mesh::default()),
            mesh_generation: 0,
            missing: MissingLocations::default(),
        }
    }

    /// Runs one tick at wall-clock time `now`
    pub fn update(&mut self, now: Instant) -> TickOutcome {
        let outcome = match self.tick(now) {
            Ok(outcome) => outcome,
            // A dead process reports the same way whichever read hit it first
            Err(error) if error.is_handle_invalid() => {
                TickOutcome::Failed(TickError::Fault(ReadFault::HandleInvalid))
            }
            Err(error) => TickOutcome::Failed(error),
        };

        match outcome {
            TickOutcome::Failed(error) => {
                debug!(%error, "tick failed");
                self.health.record_failure(error.is_handle_invalid());
            }
            _ => self.health.record_success(),
        }
        outcome
    }

    fn tick(&mut self, now: Instant) -> Result<TickOutcome, TickError> {
        let header = self.read_header()?;
        if !header.is_in_game() {
            self.counter_address = None;
            return Ok(TickOutcome::OutOfContext);
        }

        let outcome = self.observe_frame(&header);
        self.run_mesh_scheduler(now);
        outcome
    }

    fn read_header(&mut self) -> Result<LocalDataHeader, TickError> {
        let address = self
            .settings
            .layout
            .local_data
            .locate(&self.reader, self.table)
            .map_err(|error| self.missing.check(error, "local data"))?;
        Ok(self.reader.read(address)?)
    }

    fn locate_counter(&mut self) -> Result<Address, TickError> {
        let address = self
            .settings
            .layout
            .frame_counter
            .locate(&self.reader, self.table)
            .map_err(|error| self.missing.check(error, "frame counter"))?;
        self.counter_address = Some(address);
        Ok(address)
    }

    fn observe_frame(&mut self, header: &LocalDataHeader) -> Result<TickOutcome, TickError> {
        let counter = match self.counter_address {
            Some(address) => address,
            None => self.locate_counter()?,
        };

        let frame = self.reader.read::<FrameCounter>(counter).map_err(|fault| {
            self.counter_address = None;
            fault
        })?;

        if !self.frames.has_advanced(frame) {
            return Ok(TickOutcome::Unchanged);
        }
        self.refresh(counter, frame, header)
    }

    /// Re-resolves every chain and publishes the frame read through them
    fn refresh(
        &mut self,
        cached: Address,
        mut frame: FrameCounter,
        header: &LocalDataHeader,
    ) -> Result<TickOutcome, TickError> {
        let counter = self.locate_counter()?;
        if counter != cached {
            debug!(from = %cached, to = %counter, "frame counter moved");
            frame = self.reader.read::<FrameCounter>(counter)?;
        }

        let table = self
            .settings
            .layout
            .actor_table
            .resolve(&self.reader, self.table)
            .map_err(|error| self.missing.check(error, "actor table"))?;
        let records = snapshot::snapshot(
            &self.reader,
            table,
            &self.settings.layout.table,
            self.settings.entity_capacity,
        )?;
        let local = self.read_local_data(header, frame);

        debug!(frame, entities = records.len(), world = local.world_sno, "refreshed");
        self.world.store(Arc::new(WorldState {
            local: Arc::new(local),
            entities: Arc::new(EntitySnapshot::new(frame, records)),
        }));
        self.frames.commit(frame);

        Ok(TickOutcome::Refreshed { frame })
    }

    fn read_local_data(&mut self, header: &LocalDataHeader, frame: FrameCounter) -> LocalData {
        let reader = self.reader;
        let table = self.table;
        let layout = &self.settings.layout;
        let missing = &mut self.missing;

        let locate = |field: &FieldRef| -> Result<Address, TickError> { Ok(field.locate(&reader, table)?) };

        let mut local = LocalData::from_header(header, frame);
        local.level_area_sno = optional(missing, "level area", || {
            Ok(reader.read::<u32>(locate(&layout.level_area)?)?)
        });
        local.level_area_name = optional(missing, "level area name", || {
            Ok(reader.read_string(locate(&layout.level_area_name)?, layout.level_area_name_len)?)
        });
        local.act_id = optional(missing, "act id", || {
            Ok(reader.read::<i32>(locate(&layout.act_id)?)?)
        });
        local.application_loop_count = optional(missing, "application loop count", || {
            Ok(reader.read::<u32>(locate(&layout.application_loop_count)?)?)
        });
        local
    }

    fn run_mesh_scheduler(&mut self, now: Instant) {
        let reader = self.reader;
        let table = self.table;
        let source = &self.settings.layout.geometry;
        let limit = self.settings.max_geometry_bytes;
        let builder = &self.builder;

        let result = self.scheduler.maybe_rebuild(now, || {
            let raw = read_geometry(&reader, table, source, limit)?;
            Ok::<_, MeshError>(builder.build(&raw)?)
        });

        match result {
            None => {}
            Some(Ok(mesh)) => {
                self.mesh.store(Arc::new(mesh));
                self.mesh_generation += 1;
                debug!(generation = self.mesh_generation, "mesh rebuilt");
            }
            Some(Err(error)) => match error.not_configured() {
                Some(missing) => self.missing.note(missing, "navigation mesh"),
                None => debug!(%error, "mesh rebuild failed; keeping previous mesh"),
            },
        }
    }

    /// Latest published entity snapshot
    pub fn current_snapshot(&self) -> Arc<EntitySnapshot> {
        Arc::clone(&self.world.load().entities)
    }

    pub fn current_local_data(&self) -> Arc<LocalData> {
        Arc::clone(&self.world.load().local)
    }

    pub fn current_world(&self) -> Arc<WorldState> {
        self.world.load()
    }

    pub fn current_mesh(&self) -> Arc<B::Mesh> {
        self.mesh.load()
    }

    pub fn health(&self) -> Health {
        self.health.health()
    }

    /// Last frame that was fully published
    pub fn last_seen_frame(&self) -> Option<FrameCounter> {
        self.frames.last_seen()
    }

    /// Number of successful mesh rebuilds so far
    pub fn mesh_generation(&self) -> u64 {
        self.mesh_generation
    }

    /// A cloneable read-only handle for other threads
    pub fn subscribe(&self) -> EngineView<B::Mesh> {
        EngineView {
            world: self.world.clone(),
            mesh: self.mesh.clone(),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn address_table(&self) -> &AddressTable {
        self.table
    }

    /// Forgets the last frame, the cached counter address and the mesh clock.
    ///
    /// Published state is kept until the next successful refresh replaces it.
    pub fn reset(&mut self) {
        self.frames.reset();
        self.scheduler.reset();
        self.counter_address = None;
        info!("engine reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MockMemory;

    #[test]
    fn test_default_settings() {
        let settings = EngineSettings::default();
        assert_eq!(settings.entity_capacity, 8192);
        assert_eq!(settings.failure_threshold, 50);
        assert_eq!(settings.mesh_cooldown, Duration::from_secs(3));
    }

    #[test]
    fn test_missing_local_data_fails_every_tick() {
        let memory = MockMemory::new();
        let table = AddressTable::new("empty", crate::address::PREFERRED_IMAGE_BASE);
        let mut engine = Engine::new(&memory, &table, EngineSettings::default(), CellMeshBuilder);

        for _ in 0..3 {
            assert_eq!(
                engine.update(Instant::now()),
                TickOutcome::Failed(TickError::NotConfigured(NotConfigured(Location::LocalData)))
            );
        }
        assert_eq!(engine.missing.0.len(), 1);
        assert_eq!(engine.health(), Health::Degraded { consecutive: 3 });
    }

    #[test]
    fn test_out_of_context_reads_nothing_else() {
        let memory = MockMemory::new();
        let table = AddressTable::new("test", crate::address::PREFERRED_IMAGE_BASE)
            .with(Location::LocalData, Address::new(0x1000));
        memory.write(Address::new(0x1000), LocalDataHeader::in_game(1, 2, [0.0; 3]));
        memory.write(Address::new(0x1000), 0u32);

        let mut engine = Engine::new(&memory, &table, EngineSettings::default(), CellMeshBuilder);
        assert_eq!(engine.update(Instant::now()), TickOutcome::OutOfContext);
        assert_eq!(memory.total_reads(), 1);
        assert_eq!(engine.mesh_generation(), 0);
        assert_eq!(engine.health(), Health::Healthy);
    }
}
