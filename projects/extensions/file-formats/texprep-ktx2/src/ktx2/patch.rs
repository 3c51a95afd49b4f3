//! Splicing a key/value entry into an existing container.
//!
//! The entry goes at the end of the key/value data (or right after the descriptor when the
//! file has none). Every byte after the insertion point moves forward by the inserted length,
//! so the level index and the supercompression global data offset are rewritten to match.
//! Level payloads are copied verbatim.

use super::constants::*;
use super::layout::{parse_layout, read_u32, Ktx2Layout};
use crate::{Ktx2Error, Ktx2Result};
use log::debug;

/// What [`insert_metadata`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchSummary {
    /// Offset in the original file at which bytes were inserted.
    pub insertion_point: u64,
    /// Size of the key/value entry itself.
    pub entry_length: u64,
    /// Total bytes inserted, including alignment padding. Every shifted offset moved by this.
    pub inserted_length: u64,
    /// Level index records whose offset was moved.
    pub levels_shifted: usize,
    /// Whether the supercompression global data was moved.
    pub sgd_shifted: bool,
}

/// Encodes one key/value entry.
///
/// `u32` key length, key bytes, NUL, zero padding to 4, `u32` value length, value, zero
/// padding to 4. The key length excludes the NUL.
pub fn encode_entry(key: &str, value: &[u8]) -> Ktx2Result<Vec<u8>> {
    validate_key(key)?;
    let key_len = u32::try_from(key.len()).map_err(|_| Ktx2Error::InvalidKey)?;
    let value_len = u32::try_from(value.len()).map_err(|_| Ktx2Error::KvdTooLarge {
        len: value.len() as u64,
    })?;

    let mut entry = Vec::with_capacity(encoded_entry_len(key, value));
    entry.extend_from_slice(&key_len.to_le_bytes());
    entry.extend_from_slice(key.as_bytes());
    entry.push(0);
    pad_to(&mut entry, KVD_ALIGNMENT);
    entry.extend_from_slice(&value_len.to_le_bytes());
    entry.extend_from_slice(value);
    pad_to(&mut entry, KVD_ALIGNMENT);
    Ok(entry)
}

fn encoded_entry_len(key: &str, value: &[u8]) -> usize {
    (4 + key.len() + 1).next_multiple_of(KVD_ALIGNMENT)
        + (4 + value.len()).next_multiple_of(KVD_ALIGNMENT)
}

fn pad_to(buf: &mut Vec<u8>, alignment: usize) {
    let len = buf.len().next_multiple_of(alignment);
    buf.resize(len, 0);
}

fn validate_key(key: &str) -> Ktx2Result<()> {
    if key.is_empty() || key.as_bytes().contains(&0) {
        return Err(Ktx2Error::InvalidKey);
    }
    Ok(())
}

/// Returns `true` if the key/value data already holds an entry for `key`.
///
/// Entries are walked one by one, so a value that happens to contain the key is not a match.
/// Walking stops at the first malformed entry.
pub fn contains_key(data: &[u8], layout: &Ktx2Layout, key: &str) -> bool {
    kvd_bytes(data, layout).is_some_and(|kvd| {
        KvdEntries::new(kvd)
            .map_while(Result::ok)
            .any(|entry| entry.key == key.as_bytes())
    })
}

/// Reads the value stored under `key`.
///
/// Finds entries written by [`insert_metadata`] as well as standard
/// `keyAndValueByteLength` entries. Returns `Ok(None)` if the file has no such entry.
///
/// # Errors
///
/// Layout validation errors from [`parse_layout`], or [`Ktx2Error::Truncated`] if an
/// entry before the match runs past the end of the key/value data.
pub fn read_metadata<'a>(data: &'a [u8], key: &str) -> Ktx2Result<Option<&'a [u8]>> {
    validate_key(key)?;
    let layout = parse_layout(data)?;
    let Some(kvd) = kvd_bytes(data, &layout) else {
        return Ok(None);
    };

    for entry in KvdEntries::new(kvd) {
        let entry = entry?;
        if entry.key == key.as_bytes() {
            return Ok(Some(entry.value));
        }
    }
    Ok(None)
}

fn kvd_bytes<'a>(data: &'a [u8], layout: &Ktx2Layout) -> Option<&'a [u8]> {
    if layout.kvd.is_empty() {
        return None;
    }
    data.get(layout.kvd.offset as usize..layout.kvd.end() as usize)
}

/// One key/value pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KvdEntry<'a> {
    key: &'a [u8],
    value: &'a [u8],
}

/// Iterates the entries of the key/value data.
///
/// Every entry starts with a `u32` length `n`. If the next `n` bytes hold a NUL, they are a
/// standard `key NUL value` entry. Otherwise they are the key of an [`encode_entry`] entry,
/// followed by NUL, padding and a `u32` length prefixed value. A zero length or a missing
/// NUL ends the walk.
struct KvdEntries<'a> {
    kvd: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> KvdEntries<'a> {
    fn new(kvd: &'a [u8]) -> Self {
        Self {
            kvd,
            pos: 0,
            done: false,
        }
    }

    fn truncated(&mut self, needed: usize) -> Option<Ktx2Result<KvdEntry<'a>>> {
        self.done = true;
        Some(Err(Ktx2Error::Truncated {
            needed: needed as u64,
            available: self.kvd.len() as u64,
        }))
    }
}

impl<'a> Iterator for KvdEntries<'a> {
    type Item = Ktx2Result<KvdEntry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let kvd = self.kvd;
        let start = self.pos;
        if self.done || start + 4 > kvd.len() {
            return None;
        }
        let len = read_u32(kvd, start) as usize;
        if len == 0 {
            self.done = true;
            return None;
        }
        let body = start + 4;
        let Some(head) = kvd.get(body..body + len) else {
            return self.truncated(body + len);
        };

        if let Some(nul) = head.iter().position(|&b| b == 0) {
            self.pos = (body + len).next_multiple_of(KVD_ALIGNMENT);
            return Some(Ok(KvdEntry {
                key: &head[..nul],
                value: &head[nul + 1..],
            }));
        }

        if kvd.get(body + len) != Some(&0) {
            self.done = true;
            return None;
        }
        let value_len_at = start + (4 + len + 1).next_multiple_of(KVD_ALIGNMENT);
        let value_at = value_len_at + 4;
        if kvd.len() < value_at {
            return self.truncated(value_at);
        }
        let value_len = read_u32(kvd, value_len_at) as usize;
        let Some(value) = kvd.get(value_at..value_at + value_len) else {
            return self.truncated(value_at + value_len);
        };
        self.pos = (value_at + value_len).next_multiple_of(KVD_ALIGNMENT);
        Some(Ok(KvdEntry { key: head, value }))
    }
}

/// Alignment that every shift must preserve so that level data stays aligned.
///
/// Supercompressed levels are 8 byte aligned. Otherwise levels are aligned to
/// `lcm(4, bytesPlane0)`, falling back to 4 when the descriptor is unreadable.
fn level_alignment(data: &[u8], layout: &Ktx2Layout) -> u64 {
    if layout.supercompression_scheme != 0 {
        return SUPERCOMPRESSED_LEVEL_ALIGNMENT;
    }
    let bytes_plane0 = if layout.dfd.length as usize > DFD_BYTES_PLANE0_OFFSET {
        data.get(layout.dfd.offset as usize + DFD_BYTES_PLANE0_OFFSET)
            .map_or(0, |&b| u64::from(b))
    } else {
        0
    };
    if bytes_plane0 == 0 {
        return KVD_ALIGNMENT as u64;
    }
    lcm(KVD_ALIGNMENT as u64, bytes_plane0)
}

fn lcm(a: u64, b: u64) -> u64 {
    fn gcd(mut a: u64, mut b: u64) -> u64 {
        while b != 0 {
            (a, b) = (b, a % b);
        }
        a
    }
    a / gcd(a, b) * b
}

/// Checks that everything which stays in place ends before the insertion point and
/// everything which moves starts after it.
fn check_ordering(layout: &Ktx2Layout, insertion_point: u64) -> Ktx2Result<()> {
    let conflict = |region: &'static str, offset: u64| Ktx2Error::RegionOverlapsInsertion {
        region,
        offset,
        insertion_point,
    };

    if layout.level_index_end() > insertion_point {
        return Err(conflict("level index", HEADER_SIZE as u64));
    }
    if !layout.dfd.is_empty() && layout.dfd.end() > insertion_point {
        return Err(conflict("dfd", layout.dfd.offset));
    }
    if !layout.kvd.is_empty() && layout.kvd.offset < layout.level_index_end() {
        return Err(conflict("kvd", layout.kvd.offset));
    }
    if !layout.sgd.is_empty() && layout.sgd.offset < insertion_point {
        return Err(conflict("sgd", layout.sgd.offset));
    }
    for level in &layout.levels {
        if level.byte_length != 0 && level.byte_offset < insertion_point {
            return Err(conflict("level", level.byte_offset));
        }
    }
    Ok(())
}

/// Inserts a key/value entry holding `value` under `key` and returns the patched file.
///
/// The input is left untouched. Level payloads and lengths are preserved; every level offset
/// (and the supercompression global data offset) moves forward by
/// [`PatchSummary::inserted_length`], which is a multiple of 4 and of the level alignment.
///
/// # Errors
///
/// - Layout validation errors from [`parse_layout`]
/// - [`Ktx2Error::KeyExists`] if the key is already present
/// - [`Ktx2Error::InvalidKey`] for an empty key or one containing NUL
/// - [`Ktx2Error::RegionOverlapsInsertion`] if the regions are out of order
/// - [`Ktx2Error::KvdTooLarge`] if the key/value data would overflow its header fields
pub fn insert_metadata(
    data: &[u8],
    key: &str,
    value: &[u8],
) -> Ktx2Result<(Vec<u8>, PatchSummary)> {
    let layout = parse_layout(data)?;
    validate_key(key)?;
    if contains_key(data, &layout, key) {
        return Err(Ktx2Error::KeyExists(key.to_string()));
    }

    let insertion_point = layout.insertion_point();
    check_ordering(&layout, insertion_point)?;

    let entry = encode_entry(key, value)?;
    let entry_length = entry.len() as u64;
    let leading = insertion_point.next_multiple_of(KVD_ALIGNMENT as u64) - insertion_point;
    let inserted_length =
        (leading + entry_length).next_multiple_of(level_alignment(data, &layout));

    let (kvd_offset, kvd_length) = if layout.kvd.is_empty() {
        (insertion_point + leading, entry_length)
    } else {
        (layout.kvd.offset, layout.kvd.length + leading + entry_length)
    };
    let kvd_offset = to_u32_field(kvd_offset)?;
    let kvd_length = to_u32_field(kvd_length)?;

    let split = insertion_point as usize;
    let mut out = Vec::with_capacity(data.len() + inserted_length as usize);
    out.extend_from_slice(&data[..split]);
    out.resize(split + leading as usize, 0);
    out.extend_from_slice(&entry);
    out.resize(split + inserted_length as usize, 0);
    out.extend_from_slice(&data[split..]);

    write_u32(&mut out, KVD_OFFSET, kvd_offset);
    write_u32(&mut out, KVD_LENGTH, kvd_length);

    let sgd_shifted = !layout.sgd.is_empty();
    if sgd_shifted {
        write_u64(&mut out, SGD_OFFSET, layout.sgd.offset + inserted_length);
    }

    let mut levels_shifted = 0;
    for (i, level) in layout.levels.iter().enumerate() {
        if level.byte_offset < insertion_point {
            continue;
        }
        let at = HEADER_SIZE + i * LEVEL_INDEX_ENTRY_SIZE;
        write_u64(&mut out, at, level.byte_offset + inserted_length);
        levels_shifted += 1;
    }

    let summary = PatchSummary {
        insertion_point,
        entry_length,
        inserted_length,
        levels_shifted,
        sgd_shifted,
    };
    debug!("Inserted '{key}' into KTX2 key/value data: {summary:?}");
    Ok((out, summary))
}

fn to_u32_field(value: u64) -> Ktx2Result<u32> {
    u32::try_from(value).map_err(|_| Ktx2Error::KvdTooLarge { len: value })
}

fn write_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn write_u64(data: &mut [u8], offset: usize, value: u64) {
    data[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    const KEY: &str = "texprep.histogram";

    #[test]
    fn entry_layout() {
        let entry = encode_entry("ab", &[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(
            entry,
            vec![2, 0, 0, 0, b'a', b'b', 0, 0, 5, 0, 0, 0, 1, 2, 3, 4, 5, 0, 0, 0]
        );
        assert_eq!(entry.len(), encoded_entry_len("ab", &[1, 2, 3, 4, 5]));
    }

    #[rstest]
    #[case("")]
    #[case("bad\0key")]
    fn invalid_keys_are_rejected(#[case] key: &str) {
        assert!(matches!(encode_entry(key, &[]), Err(Ktx2Error::InvalidKey)));
    }

    #[rstest]
    #[case(Ktx2Fixture::new(16, 16, &[256, 64, 16, 4]))]
    #[case(Ktx2Fixture::new(8, 4, &[32, 8]).with_kvd_entry("KTXwriter", b"texprep 0.1"))]
    #[case(Ktx2Fixture::new(8, 8, &[64]).with_supercompression(2).with_sgd(12))]
    #[case(Ktx2Fixture::new(4, 4, &[16]).with_bytes_plane0(12))]
    fn patch_preserves_levels_and_shifts_offsets(#[case] fixture: Ktx2Fixture) {
        let value = vec![0x5A; 23];
        let data = fixture.build();
        let before = parse_layout(&data).unwrap();

        let (patched, summary) = insert_metadata(&data, KEY, &value).unwrap();
        let after = parse_layout(&patched).unwrap();

        assert_eq!(summary.inserted_length % 4, 0);
        assert_eq!(patched.len() as u64, data.len() as u64 + summary.inserted_length);
        assert_eq!(summary.levels_shifted, before.levels.len());
        for (old, new) in before.levels.iter().zip(&after.levels) {
            assert_eq!(new.byte_offset, old.byte_offset + summary.inserted_length);
            assert_eq!(new.byte_length, old.byte_length);
            assert_eq!(
                new.uncompressed_byte_length,
                old.uncompressed_byte_length
            );
        }
        assert_eq!(level_payloads(&data, &before), level_payloads(&patched, &after));

        let dfd = before.dfd.offset as usize..before.dfd.end() as usize;
        assert_eq!(after.dfd, before.dfd);
        assert_eq!(&patched[dfd.clone()], &data[dfd]);
        assert_eq!(&patched[..KVD_OFFSET], &data[..KVD_OFFSET]);
        assert_eq!(read_metadata(&patched, KEY).unwrap(), Some(&value[..]));
    }

    #[test]
    fn level_alignment_is_preserved() {
        let data = Ktx2Fixture::new(4, 4, &[16, 16])
            .with_bytes_plane0(16)
            .build();
        let (patched, summary) = insert_metadata(&data, KEY, &[1, 2, 3]).unwrap();
        assert_eq!(summary.inserted_length % 16, 0);
        for level in parse_layout(&patched).unwrap().levels {
            assert_eq!(level.byte_offset % 16, 0);
        }
    }

    #[test]
    fn sgd_moves_with_inserted_bytes() {
        let data = Ktx2Fixture::new(8, 8, &[64, 16])
            .with_supercompression(1)
            .with_sgd(20)
            .build();
        let before = parse_layout(&data).unwrap();
        let (patched, summary) = insert_metadata(&data, KEY, &[7; 9]).unwrap();
        let after = parse_layout(&patched).unwrap();

        assert!(summary.sgd_shifted);
        assert_eq!(summary.inserted_length % 8, 0);
        assert_eq!(after.sgd.offset, before.sgd.offset + summary.inserted_length);
        assert_eq!(after.sgd.length, before.sgd.length);
        assert_eq!(
            &patched[after.sgd.offset as usize..after.sgd.end() as usize],
            &data[before.sgd.offset as usize..before.sgd.end() as usize]
        );
    }

    #[test]
    fn existing_kvd_is_extended() {
        let data = Ktx2Fixture::new(4, 4, &[16])
            .with_kvd_entry("KTXorientation", b"rd")
            .build();
        let before = parse_layout(&data).unwrap();
        let (patched, summary) = insert_metadata(&data, KEY, &[1; 6]).unwrap();
        let after = parse_layout(&patched).unwrap();

        assert_eq!(summary.insertion_point, before.kvd.end());
        assert_eq!(after.kvd.offset, before.kvd.offset);
        assert_eq!(after.kvd.length, before.kvd.length + summary.entry_length);
        assert_eq!(
            &patched[before.kvd.offset as usize..before.kvd.end() as usize],
            &data[before.kvd.offset as usize..before.kvd.end() as usize]
        );
    }

    #[test]
    fn missing_kvd_is_created_after_dfd() {
        let data = Ktx2Fixture::new(4, 4, &[16]).build();
        let before = parse_layout(&data).unwrap();
        let (patched, summary) = insert_metadata(&data, KEY, &[1; 6]).unwrap();
        let after = parse_layout(&patched).unwrap();

        assert_eq!(summary.insertion_point, before.dfd.end());
        assert_eq!(after.kvd.offset, before.dfd.end());
        assert_eq!(after.kvd.length, summary.entry_length);
    }

    #[test]
    fn duplicate_key_is_refused() {
        let data = Ktx2Fixture::new(4, 4, &[16]).build();
        let (patched, _) = insert_metadata(&data, KEY, &[1]).unwrap();
        assert!(matches!(
            insert_metadata(&patched, KEY, &[2]),
            Err(Ktx2Error::KeyExists(key)) if key == KEY
        ));

        let standard = Ktx2Fixture::new(4, 4, &[16])
            .with_kvd_entry(KEY, b"\x02\x11")
            .build();
        assert!(matches!(
            insert_metadata(&standard, KEY, &[2]),
            Err(Ktx2Error::KeyExists(_))
        ));
    }

    #[test]
    fn key_inside_another_value_is_not_a_duplicate() {
        let mut lookalike = KEY.as_bytes().to_vec();
        lookalike.push(0);
        let data = Ktx2Fixture::new(4, 4, &[16])
            .with_kvd_entry("KTXwriter", &lookalike)
            .build();
        let (other, _) = insert_metadata(&data, "texprep.other", &lookalike).unwrap();

        let (patched, _) = insert_metadata(&other, KEY, &[7, 8]).unwrap();

        assert_eq!(read_metadata(&patched, KEY).unwrap(), Some(&[7u8, 8][..]));
        assert_eq!(
            read_metadata(&patched, "texprep.other").unwrap(),
            Some(&lookalike[..])
        );
        assert_eq!(
            read_metadata(&patched, "KTXwriter").unwrap(),
            Some(&lookalike[..])
        );
    }

    #[test]
    fn standard_entry_value_is_read() {
        let data = Ktx2Fixture::new(4, 4, &[16])
            .with_kvd_entry("KTXorientation", b"rd")
            .with_kvd_entry("KTXwriter", b"texprep")
            .build();
        assert_eq!(read_metadata(&data, "KTXwriter").unwrap(), Some(&b"texprep"[..]));
        assert_eq!(read_metadata(&data, KEY).unwrap(), None);
    }

    #[test]
    fn truncated_entry_is_reported() {
        let mut data = Ktx2Fixture::new(4, 4, &[16])
            .with_kvd_entry("KTXwriter", b"texprep")
            .build();
        let kvd_offset = parse_layout(&data).unwrap().kvd.offset as usize;
        data[kvd_offset..kvd_offset + 4].copy_from_slice(&1000u32.to_le_bytes());
        assert!(matches!(
            read_metadata(&data, KEY),
            Err(Ktx2Error::Truncated { .. })
        ));
    }

    #[test]
    fn second_key_can_be_added() {
        let data = Ktx2Fixture::new(4, 4, &[16]).build();
        let (once, _) = insert_metadata(&data, KEY, &[1, 2]).unwrap();
        let (twice, _) = insert_metadata(&once, "texprep.other", &[3]).unwrap();
        assert_eq!(read_metadata(&twice, KEY).unwrap(), Some(&[1u8, 2][..]));
        assert_eq!(read_metadata(&twice, "texprep.other").unwrap(), Some(&[3u8][..]));
    }

    #[test]
    fn level_before_insertion_point_is_rejected() {
        let mut data = Ktx2Fixture::new(4, 4, &[16]).build();
        let dfd_offset = parse_layout(&data).unwrap().dfd.offset;
        data[HEADER_SIZE..HEADER_SIZE + 8].copy_from_slice(&dfd_offset.to_le_bytes());
        assert!(matches!(
            insert_metadata(&data, KEY, &[1]),
            Err(Ktx2Error::RegionOverlapsInsertion { region: "level", .. })
        ));
    }

    #[test]
    fn read_metadata_without_kvd_is_none() {
        let data = Ktx2Fixture::new(4, 4, &[16]).build();
        assert_eq!(read_metadata(&data, KEY).unwrap(), None);
    }
}
