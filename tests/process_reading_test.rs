//! Integration tests for the platform process backend, reading this process

#![cfg(any(windows, target_os = "linux"))]

use live_mirror::core::types::ReadFault;
use live_mirror::game::ActorCommonData;
use live_mirror::memory::{follow, MemoryReader, PointerWidth, ReadMemory};
use live_mirror::process::ProcessHandle;
use live_mirror::Address;

fn open_self() -> ProcessHandle {
    ProcessHandle::open_for_read(std::process::id()).expect("Failed to open current process")
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_typed_read() {
    let handle = open_self();
    let reader = MemoryReader::new(&handle, PointerWidth::native());

    let test_value: i64 = -123456789;
    let test_address = Address::new(&test_value as *const i64 as usize);
    assert_eq!(reader.read::<i64>(test_address), Ok(test_value));
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_record_read() {
    let handle = open_self();
    let reader = MemoryReader::new(&handle, PointerWidth::native());

    let record = ActorCommonData::new(77, "Local_Actor", 4, [1.0, 2.0, 3.0]);
    let address = Address::new(&record as *const ActorCommonData as usize);
    assert_eq!(reader.read::<ActorCommonData>(address), Ok(record));
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_follow_native_pointers() {
    let handle = open_self();
    let reader = MemoryReader::new(&handle, PointerWidth::native());

    let target: u32 = 5;
    let middle: Box<[usize; 2]> = Box::new([0, &target as *const u32 as usize]);
    let root: usize = middle.as_ptr() as usize;

    let end = follow(
        &reader,
        Address::new(&root as *const usize as usize),
        &[0, std::mem::size_of::<usize>()],
    )
    .unwrap();
    assert_eq!(end, Address::new(&target as *const u32 as usize));
    assert_eq!(reader.read::<u32>(end), Ok(5));
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_unreadable_address_faults() {
    let handle = open_self();
    let mut buffer = [0u8; 4];
    let result = handle.read_bytes(Address::new(0), &mut buffer);
    assert!(matches!(result, Err(ReadFault::Unmapped { .. })));
}
