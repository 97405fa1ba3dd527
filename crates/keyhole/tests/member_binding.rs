//! Integration tests for tagged member accessors.
//!
//! The fixture module keeps its fields and member functions private and
//! declares access paths where the members are visible; callers outside
//! the module reach them only through the tagged accessors.

use keyhole::bind;

mod sensor {
    use keyhole::{bind_field, bind_method};
    use std::mem::offset_of;

    #[repr(C)]
    pub struct Sensor {
        kind: u32,
        reading: u64,
    }

    impl Sensor {
        pub fn new(kind: u32, reading: u64) -> Self {
            Self { kind, reading }
        }
    }

    fn reading_of(s: &Sensor) -> u64 {
        s.reading
    }

    // Sibling overload under its own tag, mirroring a const/non-const
    // method pair.
    fn reading_negated(s: &Sensor) -> i64 {
        -(s.reading as i64)
    }

    fn set_reading(s: &mut Sensor, value: u64) {
        s.reading = value;
    }

    fn into_reading(s: Sensor) -> u64 {
        s.reading
    }

    extern "C" fn kind_of(s: &Sensor) -> u32 {
        s.kind
    }

    bind_field!(Sensor, 0, u64, offset_of!(Sensor, reading));
    bind_field!(Sensor, 1, u32, offset_of!(Sensor, kind));
    bind_method!(Sensor, 2, fn(&self) -> u64 = reading_of);
    bind_method!(Sensor, 3, fn(&self) -> i64 = reading_negated);
    bind_method!(Sensor, 4, fn(&mut self, value: u64) = set_reading);
    bind_method!(Sensor, 5, fn(self) -> u64 = into_reading);
    bind_method!(Sensor, 6, extern "C" fn(&self) -> u32 = kind_of);

    /// An embedding type: the layout-level rendition of public
    /// derivation. It re-binds the embedded member at a composed
    /// offset, plus a member of its own under the same tag number.
    #[repr(C)]
    pub struct Calibrated {
        #[allow(dead_code)]
        base: Sensor,
        #[allow(dead_code)]
        tweak: i32,
    }

    impl Calibrated {
        pub fn new(kind: u32, reading: u64, tweak: i32) -> Self {
            Self {
                base: Sensor::new(kind, reading),
                tweak,
            }
        }
    }

    bind_field!(Calibrated, 0, i32, offset_of!(Calibrated, tweak));
    bind_field!(
        Calibrated,
        1,
        u64,
        offset_of!(Calibrated, base) + offset_of!(Sensor, reading)
    );
}

mod wire {
    //! A foreign-layout fixture: fields are private and no offsets are
    //! exported, but the on-wire layout is documented, so the paths are
    //! declared from outside knowledge.

    #[repr(C)]
    pub struct WireHeader {
        #[allow(dead_code)]
        magic: u32,
        #[allow(dead_code)]
        length: u32,
    }

    impl WireHeader {
        pub fn new(magic: u32, length: u32) -> Self {
            Self { magic, length }
        }
    }
}

// Documented layout: magic at 0, length at 4.
keyhole::bind_field!(wire::WireHeader, 0, u32, 0);
keyhole::bind_field!(wire::WireHeader, 1, u32, 4);

use sensor::{Calibrated, Sensor};
use wire::WireHeader;

#[test]
fn field_access_matches_in_module_view() {
    let s = Sensor::new(7, 1234);
    assert_eq!(*bind::get::<0, _>(&s), 1234);
    assert_eq!(*bind::get::<1, _>(&s), 7);
}

#[test]
fn field_access_preserves_mutability() {
    let mut s = Sensor::new(7, 1234);
    let r: &u64 = bind::get::<0, _>(&s);
    assert_eq!(*r, 1234);
    let m: &mut u64 = bind::get_mut::<0, _>(&mut s);
    *m = 99;
    assert_eq!(*bind::get::<0, _>(&s), 99);
}

#[test]
fn by_value_access_moves_member_out() {
    let s = Sensor::new(7, 1234);
    assert_eq!(bind::take::<0, _>(s), 1234);
}

#[test]
fn method_paths_forward_receiver_and_arguments() {
    let mut s = Sensor::new(7, 1234);
    assert_eq!(bind::bound::<2, _>(&s)(()), 1234);
    assert_eq!(bind::bound::<3, _>(&s)(()), -1234);
    bind::bound_mut::<4, _>(&mut s)((4321,));
    assert_eq!(bind::bound::<2, _>(&s)(()), 4321);
    assert_eq!(bind::bound_once::<5, _>(s)(()), 4321);
}

#[test]
fn extern_method_path_forwards() {
    let s = Sensor::new(42, 0);
    assert_eq!(bind::bound::<6, _>(&s)(()), 42);
}

#[test]
fn embedding_type_rebinds_at_composed_offsets() {
    let c = Calibrated::new(1, 4321, -5);
    assert_eq!(*bind::get::<0, _>(&c), -5);
    assert_eq!(*bind::get::<1, _>(&c), 4321);
}

#[test]
fn tags_are_scoped_per_host_type() {
    let s = Sensor::new(2, 10);
    let c = Calibrated::new(3, 20, 30);
    // Tag 0 names unrelated members on the two hosts.
    let _: &u64 = bind::get::<0, _>(&s);
    let _: &i32 = bind::get::<0, _>(&c);
}

#[test]
fn declared_literal_offsets_reach_foreign_layout() {
    let h = WireHeader::new(0xfeed_beef, 512);
    assert_eq!(*bind::get::<0, _>(&h), 0xfeed_beef);
    assert_eq!(*bind::get::<1, _>(&h), 512);
}

#[test]
fn accessors_agree_across_self_forms() {
    let mut s = Sensor::new(0, 77);
    let via_ref = *bind::get::<0, _>(&s);
    let via_mut = *bind::get_mut::<0, _>(&mut s);
    let via_move = bind::take::<0, _>(s);
    assert_eq!(via_ref, 77);
    assert_eq!(via_mut, 77);
    assert_eq!(via_move, 77);
}
