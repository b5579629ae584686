//! Buffer assembly helpers and a sample schema shared by unit tests, benches and
//! fuzz targets.

use std::sync::Arc;

use crate::options::Endian;
use crate::tables::{Element, Field, Schema};
use crate::wire::ScalarKind;

/// Appends raw values front to back and patches offsets afterwards.
///
/// Every write returns the position it started at, offsets always point forward
/// except a table's soffset, which points back at its vtable.
#[derive(Debug, Default)]
pub struct LayoutWriter {
    bytes: Vec<u8>,
    endian: Endian,
}

macro_rules! write_scalar {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self, value: $ty) -> usize {
                let pos = self.bytes.len();
                match self.endian {
                    Endian::Little => self.bytes.extend_from_slice(&value.to_le_bytes()),
                    Endian::Big => self.bytes.extend_from_slice(&value.to_be_bytes()),
                }
                pos
            }
        )*
    };
}

impl LayoutWriter {
    pub fn new(endian: Endian) -> Self {
        LayoutWriter {
            bytes: Vec::new(),
            endian,
        }
    }

    pub fn little() -> Self {
        Self::new(Endian::Little)
    }

    pub fn position(&self) -> usize {
        self.bytes.len()
    }

    write_scalar!(
        u8: u8,
        i8: i8,
        u16: u16,
        i16: i16,
        u32: u32,
        i32: i32,
        u64: u64,
        i64: i64,
        f32: f32,
        f64: f64,
    );

    pub fn bytes(&mut self, bytes: &[u8]) -> usize {
        let pos = self.bytes.len();
        self.bytes.extend_from_slice(bytes);
        pos
    }

    pub fn pad_to(&mut self, align: usize) {
        while self.bytes.len() % align != 0 {
            self.bytes.push(0);
        }
    }

    fn patch(&mut self, at: usize, le: [u8; 4], be: [u8; 4]) {
        let raw = match self.endian {
            Endian::Little => le,
            Endian::Big => be,
        };
        self.bytes[at..at + 4].copy_from_slice(&raw);
    }

    pub fn patch_u32(&mut self, at: usize, value: u32) {
        self.patch(at, value.to_le_bytes(), value.to_be_bytes());
    }

    pub fn patch_i32(&mut self, at: usize, value: i32) {
        self.patch(at, value.to_le_bytes(), value.to_be_bytes());
    }

    /// Reserves a uoffset slot, fill it with [`point_to`](Self::point_to).
    pub fn uoffset(&mut self) -> usize {
        self.u32(0)
    }

    pub fn point_to(&mut self, slot: usize, target: usize) {
        assert!(target >= slot, "uoffsets only point forward");
        self.patch_u32(slot, (target - slot) as u32);
    }

    /// Writes a vtable: byte size, inline object size, one entry per field slot.
    pub fn vtable(&mut self, object_size: u16, offsets: &[u16]) -> usize {
        let pos = self.u16((4 + 2 * offsets.len()) as u16);
        self.u16(object_size);
        for &offset in offsets {
            self.u16(offset);
        }
        pos
    }

    /// Starts a table instance using the vtable at `vtable`.
    pub fn table(&mut self, vtable: usize) -> usize {
        let pos = self.position();
        self.i32(pos as i32 - vtable as i32)
    }

    /// Length, UTF-8 bytes and the trailing NUL.
    pub fn string(&mut self, text: &str) -> usize {
        let pos = self.u32(text.len() as u32);
        self.bytes(text.as_bytes());
        self.u8(0);
        pos
    }

    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

pub const MONSTER_IDENTIFIER: &[u8; 4] = b"MONS";

/// ```text
/// struct Vec3 { x, y, z: float32 }
/// table Weapon { name: string; damage: int16 }
/// table Monster {
///   pos: Vec3; mana: int16; hp: int16; name: string; friendly: bool (deprecated);
///   inventory: [uint8]; weapons: [Weapon]; path: [Vec3]; enemy: Monster;
///   coords: [[float32; 2]];
/// }
/// ```
pub fn monster_schema() -> Arc<Schema> {
    let mut schema = Schema::new();
    schema
        .register_struct(
            "Vec3",
            [
                Field::scalar("x", ScalarKind::F32),
                Field::scalar("y", ScalarKind::F32),
                Field::scalar("z", ScalarKind::F32),
            ],
        )
        .register_table(
            "Weapon",
            [
                Field::string("name"),
                Field::scalar("damage", ScalarKind::I16),
            ],
        )
        .register_table(
            "Monster",
            [
                Field::object("pos", "Vec3"),
                Field::scalar("mana", ScalarKind::I16),
                Field::scalar("hp", ScalarKind::I16),
                Field::string("name"),
                Field::deprecated("friendly"),
                Field::vector("inventory", Element::scalar(ScalarKind::U8)),
                Field::vector("weapons", Element::object("Weapon")),
                Field::vector("path", Element::object("Vec3")),
                Field::object("enemy", "Monster"),
                Field::vector("coords", Element::scalar_group(ScalarKind::F32, 2)),
            ],
        );
    Arc::new(schema)
}

/// An "Orc" at (1, 2, 3) with 300 hp, no mana, two weapons sharing one vtable
/// and a "Goblin" enemy, tagged with [`MONSTER_IDENTIFIER`].
pub fn monster_buffer(endian: Endian) -> Vec<u8> {
    let mut w = LayoutWriter::new(endian);
    let root = w.uoffset();
    w.bytes(MONSTER_IDENTIFIER);

    let vt = w.vtable(44, &[4, 0, 16, 20, 18, 24, 28, 32, 36, 40]);
    let monster = w.table(vt);
    w.f32(1.0);
    w.f32(2.0);
    w.f32(3.0);
    w.i16(300);
    w.u8(1);
    w.u8(0);
    let name = w.uoffset();
    let inventory = w.uoffset();
    let weapons = w.uoffset();
    let path = w.uoffset();
    let enemy = w.uoffset();
    let coords = w.uoffset();
    w.point_to(root, monster);

    let pos = w.string("Orc");
    w.point_to(name, pos);
    w.pad_to(4);

    let pos = w.u32(5);
    w.bytes(&[0, 1, 2, 3, 4]);
    w.point_to(inventory, pos);
    w.pad_to(4);

    let pos = w.u32(2);
    let first = w.uoffset();
    let second = w.uoffset();
    w.point_to(weapons, pos);
    let weapon_vt = w.vtable(12, &[4, 8]);
    for (slot, label, damage) in [(first, "Sword", 3), (second, "Axe", 5)] {
        let weapon = w.table(weapon_vt);
        let label_slot = w.uoffset();
        w.i16(damage);
        w.i16(0);
        w.point_to(slot, weapon);
        let pos = w.string(label);
        w.point_to(label_slot, pos);
        w.pad_to(4);
    }

    let pos = w.u32(2);
    for v in [1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
        w.f32(v);
    }
    w.point_to(path, pos);

    let enemy_vt = w.vtable(8, &[0, 0, 0, 4]);
    let goblin = w.table(enemy_vt);
    let goblin_name = w.uoffset();
    w.point_to(enemy, goblin);
    let pos = w.string("Goblin");
    w.point_to(goblin_name, pos);
    w.pad_to(4);

    let pos = w.u32(2);
    for v in [0.5, 1.5, 2.5, 3.5] {
        w.f32(v);
    }
    w.point_to(coords, pos);

    w.finish()
}

#[cfg(test)]
mod monster {
    use super::*;
    use crate::decoding::Decoder;
    use crate::error::Error;
    use crate::options::DecoderOptions;
    use crate::reflection::{Object, Value};

    fn check_orc(orc: &Object<'_>) {
        assert_eq!(orc.type_name(), "Monster");
        assert_eq!(
            orc.keys().collect::<Vec<_>>(),
            vec!["pos", "hp", "name", "inventory", "weapons", "path", "enemy", "coords"]
        );
        assert!(!orc.contains_key("mana"));
        assert!(!orc.contains_key("friendly"));

        let pos = orc.get("pos").and_then(Value::as_object).unwrap();
        assert_eq!(pos.type_name(), "Vec3");
        assert_eq!(pos.get("x"), Some(&Value::F32(1.0)));
        assert_eq!(pos.get("z"), Some(&Value::F32(3.0)));

        assert_eq!(orc.get("hp"), Some(&Value::I16(300)));
        assert_eq!(orc.get("name").and_then(Value::as_str), Some("Orc"));

        let inventory = orc.get("inventory").and_then(Value::as_view).unwrap();
        assert_eq!(inventory.as_bytes(), &[0, 1, 2, 3, 4]);

        let weapons = orc.get("weapons").and_then(Value::as_list).unwrap();
        let summary: Vec<_> = weapons
            .iter()
            .filter_map(Value::as_object)
            .map(|w| {
                (
                    w.get("name").and_then(Value::as_str).unwrap().to_owned(),
                    w.get("damage").and_then(Value::as_i64).unwrap(),
                )
            })
            .collect();
        assert_eq!(summary, vec![("Sword".to_owned(), 3), ("Axe".to_owned(), 5)]);

        let path = orc.get("path").and_then(Value::as_list).unwrap();
        assert_eq!(path.len(), 2);
        let second = path[1].as_object().unwrap();
        assert_eq!(second.get("y"), Some(&Value::F32(1.0)));

        let enemy = orc.get("enemy").and_then(Value::as_object).unwrap();
        assert_eq!(enemy.len(), 1);
        assert_eq!(enemy.get("name").and_then(Value::as_str), Some("Goblin"));

        let coords = orc.get("coords").and_then(Value::as_view).unwrap();
        assert_eq!(coords.dim(), 2);
        assert_eq!(coords.groups(), 2);
        assert_eq!(
            coords.group(1).unwrap().typed::<f32>().unwrap().to_vec(),
            vec![2.5, 3.5]
        );
    }

    #[test]
    fn decodes_the_whole_tree() {
        let bytes = monster_buffer(Endian::Little);
        let mut decoder = Decoder::with_schema(&bytes, monster_schema(), DecoderOptions::default());
        decoder.check_identifier(MONSTER_IDENTIFIER).unwrap();
        let orc = decoder.root("Monster").unwrap();
        check_orc(&orc);
        assert_eq!(decoder.position(), 4);

        // Monster, Weapon (resolved twice) and the Goblin's own vtable
        let stats = decoder.cache_stats();
        assert_eq!((stats.misses, stats.hits, stats.entries), (3, 1, 3));
    }

    #[test]
    fn big_endian_buffers_decode_the_same() {
        let bytes = monster_buffer(Endian::Big);
        let options = DecoderOptions::default().with_endian(Endian::Big);
        let orc = crate::decode_root(
            &bytes,
            monster_schema(),
            options,
            "Monster",
            Some(MONSTER_IDENTIFIER),
        )
        .unwrap();
        check_orc(&orc);

        let little = monster_buffer(Endian::Little);
        assert_ne!(bytes, little);
    }

    #[test]
    fn wrong_identifier_is_rejected() {
        let bytes = monster_buffer(Endian::Little);
        let err = crate::decode_root(
            &bytes,
            monster_schema(),
            DecoderOptions::default(),
            "Monster",
            Some(b"WEAP"),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::IdentifierMismatch {
                expected: *b"WEAP",
                found: *MONSTER_IDENTIFIER
            }
        );
    }

    #[test]
    fn truncated_buffers_never_panic() {
        let bytes = monster_buffer(Endian::Little);
        let schema = monster_schema();
        for len in 0..bytes.len() {
            let mut decoder =
                Decoder::with_schema(&bytes[..len], schema.clone(), DecoderOptions::default());
            assert!(decoder.root("Monster").is_err(), "prefix of {} bytes", len);
        }
    }

    #[test]
    fn inspect_root_without_a_schema() {
        let bytes = monster_buffer(Endian::Little);
        let mut decoder = Decoder::new(&bytes);
        let layout = decoder.inspect_table().unwrap();
        assert_eq!(layout.vtable_offset, 8);
        assert_eq!(layout.instance_start, 32);
        assert_eq!(layout.vtable.object_size(), Some(44));
        assert_eq!(layout.vtable.field_count(), 10);
        assert_eq!(layout.vtable.field_offset(1), None);
        assert_eq!(decoder.position(), 4);
    }

    #[test]
    fn decoders_share_a_schema_across_threads() {
        let bytes = monster_buffer(Endian::Little);
        let schema = monster_schema();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let schema = schema.clone();
                let bytes = &bytes;
                scope.spawn(move || {
                    let mut decoder =
                        Decoder::with_schema(bytes, schema, DecoderOptions::default());
                    check_orc(&decoder.root("Monster").unwrap());
                });
            }
        });
    }

    #[test]
    fn read_buffer_from_readers() {
        let bytes = monster_buffer(Endian::Little);
        let read = crate::read_buffer(&mut &bytes[..]).unwrap();
        assert_eq!(read, bytes);

        let mut reader = futures::io::Cursor::new(bytes.clone());
        let read = futures::executor::block_on(crate::read_buffer_async(&mut reader)).unwrap();
        assert_eq!(read, bytes);
    }
}
