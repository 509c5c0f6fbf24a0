use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use live_mirror::address::{AddressTable, Location};
use live_mirror::engine::{Engine, EngineSettings, TickOutcome};
use live_mirror::game::{ActorCommonData, LocalDataHeader};
use live_mirror::memory::MockMemory;
use live_mirror::mesh::CellMeshBuilder;
use live_mirror::Address;
use std::time::Instant;

const OBJECT_MANAGER: Address = Address::new(0x0800_0000);
const ACD_MANAGER: Address = Address::new(0x0810_0000);
const CONTAINER: Address = Address::new(0x0820_0000);
const RECORDS: Address = Address::new(0x0900_0000);
const STRIDE: usize = 0x180;

fn client_image(actors: usize) -> (MockMemory, AddressTable) {
    let table = AddressTable::known_build().clone();
    let memory = MockMemory::new();
    let at = |location: Location| table.resolve(location).expect("known build location");

    memory.write(at(Location::LocalData), LocalDataHeader::in_game(1, 2, [0.0; 3]));
    memory.write(at(Location::ObjectManager), OBJECT_MANAGER.as_usize() as u32);
    memory.write(OBJECT_MANAGER + 0x38, 0u32);
    memory.write(OBJECT_MANAGER + 0x7D4, ACD_MANAGER.as_usize() as u32);
    memory.write(ACD_MANAGER, CONTAINER.as_usize() as u32);
    memory.write(CONTAINER + 0x100, 8192i32);
    memory.write(CONTAINER + 0x108, actors as i32);
    memory.write(CONTAINER + 0x148, RECORDS.as_usize() as u32);
    memory.map(RECORDS, actors.max(1) * STRIDE);
    for id in 0..actors {
        let record = ActorCommonData::new(id as u32, "Bench_Actor", 1, [id as f32, 0.0, 0.0]);
        memory.write(RECORDS + id * STRIDE, record);
    }

    (memory, table)
}

fn benchmark_unchanged_tick(c: &mut Criterion) {
    let (memory, table) = client_image(256);
    let mut engine = Engine::new(&memory, &table, EngineSettings::default(), CellMeshBuilder);
    let now = Instant::now();
    engine.update(now);

    c.bench_function("tick_unchanged", |b| {
        b.iter(|| {
            let outcome = engine.update(black_box(now));
            debug_assert_eq!(outcome, TickOutcome::Unchanged);
            outcome
        });
    });
}

fn benchmark_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_refresh");

    for actors in [64usize, 1024, 8192] {
        let (memory, table) = client_image(actors);
        let mut engine = Engine::new(&memory, &table, EngineSettings::default(), CellMeshBuilder);
        let now = Instant::now();
        let counter = OBJECT_MANAGER + 0x38;
        let mut frame = 0u32;

        group.bench_with_input(BenchmarkId::from_parameter(actors), &actors, |b, _| {
            b.iter(|| {
                frame = frame.wrapping_add(1);
                memory.write(counter, frame);
                engine.update(black_box(now))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_unchanged_tick, benchmark_refresh);
criterion_main!(benches);
