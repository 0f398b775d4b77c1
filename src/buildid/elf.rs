//! Build-id extraction from ELF images.
//!
//! The linker records a content-derived build id as a note in a `PT_NOTE`
//! segment. Each note record is laid out as:
//!
//! ```text
//! ┌────────────┬────────────┬────────────┬──────────────┬──────────────┐
//! │ namesz:u32 │ descsz:u32 │  type:u32  │ name (pad 4) │ desc (pad 4) │
//! └────────────┴────────────┴────────────┴──────────────┴──────────────┘
//! ```
//!
//! The build-id record has type 3 and a 4-byte name of `"GNU\0"`; its
//! description, hex-encoded, is the identity.
//!
//! Word size and byte order come from `e_ident` and are honored explicitly -
//! a 32-bit big-endian image parses the same on any host. Anything that
//! does not parse (wrong magic, truncated tables, out-of-bounds offsets)
//! makes this strategy return `None`; it never panics and never errors out.

use std::io::{self, Read, Seek, SeekFrom};

const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];
const PT_NOTE: u32 = 4;
const NT_GNU_BUILD_ID: u32 = 3;

/// Upper bound on a note segment we are willing to load. Real note
/// segments are a few hundred bytes; anything larger is a corrupt header.
const MAX_NOTE_SEGMENT: u64 = 1 << 20;

#[derive(Debug, Clone, Copy)]
enum Endian {
    Little,
    Big,
}

impl Endian {
    fn u16_at(self, bytes: &[u8], at: usize) -> Option<u16> {
        let raw: [u8; 2] = bytes.get(at..at + 2)?.try_into().ok()?;
        Some(match self {
            Endian::Little => u16::from_le_bytes(raw),
            Endian::Big => u16::from_be_bytes(raw),
        })
    }

    fn u32_at(self, bytes: &[u8], at: usize) -> Option<u32> {
        let raw: [u8; 4] = bytes.get(at..at + 4)?.try_into().ok()?;
        Some(match self {
            Endian::Little => u32::from_le_bytes(raw),
            Endian::Big => u32::from_be_bytes(raw),
        })
    }

    fn u64_at(self, bytes: &[u8], at: usize) -> Option<u64> {
        let raw: [u8; 8] = bytes.get(at..at + 8)?.try_into().ok()?;
        Some(match self {
            Endian::Little => u64::from_le_bytes(raw),
            Endian::Big => u64::from_be_bytes(raw),
        })
    }
}

/// Extract the GNU build id from an ELF image, hex-encoded.
///
/// Returns `None` for non-ELF input, images without a build-id note, and
/// images too damaged to walk.
pub fn extract_build_id<R: Read + Seek>(image: &mut R) -> Option<String> {
    scan(image).ok().flatten()
}

fn scan<R: Read + Seek>(image: &mut R) -> io::Result<Option<String>> {
    let mut ident = [0u8; 16];
    image.seek(SeekFrom::Start(0))?;
    image.read_exact(&mut ident)?;

    if ident[..4] != ELF_MAGIC {
        return Ok(None);
    }
    let is_64 = match ident[4] {
        1 => false,
        2 => true,
        _ => return Ok(None),
    };
    let endian = match ident[5] {
        1 => Endian::Little,
        2 => Endian::Big,
        _ => return Ok(None),
    };

    // 32- and 64-bit headers place the program-header table fields at
    // different offsets and widths.
    let header_len = if is_64 { 64 } else { 52 };
    let mut header = vec![0u8; header_len];
    image.seek(SeekFrom::Start(0))?;
    image.read_exact(&mut header)?;

    let (phoff, phentsize, phnum) = if is_64 {
        (
            endian.u64_at(&header, 32),
            endian.u16_at(&header, 54),
            endian.u16_at(&header, 56),
        )
    } else {
        (
            endian.u32_at(&header, 28).map(u64::from),
            endian.u16_at(&header, 42),
            endian.u16_at(&header, 44),
        )
    };
    let (Some(phoff), Some(phentsize), Some(phnum)) = (phoff, phentsize, phnum) else {
        return Ok(None);
    };

    let min_phentsize = if is_64 { 56 } else { 32 };
    if (phentsize as usize) < min_phentsize {
        return Ok(None);
    }

    for i in 0..phnum {
        let Some(entry_offset) = u64::from(i)
            .checked_mul(u64::from(phentsize))
            .and_then(|off| phoff.checked_add(off))
        else {
            return Ok(None);
        };
        image.seek(SeekFrom::Start(entry_offset))?;
        let mut phdr = vec![0u8; phentsize as usize];
        image.read_exact(&mut phdr)?;

        if endian.u32_at(&phdr, 0) != Some(PT_NOTE) {
            continue;
        }

        let (p_offset, p_filesz) = if is_64 {
            (endian.u64_at(&phdr, 8), endian.u64_at(&phdr, 32))
        } else {
            (
                endian.u32_at(&phdr, 4).map(u64::from),
                endian.u32_at(&phdr, 16).map(u64::from),
            )
        };
        let (Some(p_offset), Some(p_filesz)) = (p_offset, p_filesz) else {
            continue;
        };
        if p_filesz == 0 || p_filesz > MAX_NOTE_SEGMENT {
            continue;
        }

        image.seek(SeekFrom::Start(p_offset))?;
        let mut notes = vec![0u8; p_filesz as usize];
        image.read_exact(&mut notes)?;

        if let Some(id) = scan_notes(&notes, endian) {
            return Ok(Some(id));
        }
    }

    Ok(None)
}

/// Walk the note records inside one `PT_NOTE` segment.
fn scan_notes(notes: &[u8], endian: Endian) -> Option<String> {
    let mut offset = 0usize;
    while offset + 12 <= notes.len() {
        let namesz = endian.u32_at(notes, offset)? as usize;
        let descsz = endian.u32_at(notes, offset + 4)? as usize;
        let ntype = endian.u32_at(notes, offset + 8)?;
        offset += 12;

        // Name and description are both padded to 4-byte alignment.
        let name_aligned = namesz.checked_add(3)? & !3;
        let desc_aligned = descsz.checked_add(3)? & !3;
        let record_end = offset
            .checked_add(name_aligned)?
            .checked_add(desc_aligned)?;
        if record_end > notes.len() {
            return None;
        }

        if ntype == NT_GNU_BUILD_ID && namesz == 4 && notes[offset..offset + 4] == *b"GNU\0" {
            let desc_start = offset + name_aligned;
            return Some(hex::encode(&notes[desc_start..desc_start + descsz]));
        }

        offset = record_end;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const BUILD_ID: [u8; 20] = [
        0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0x10, 0x32, 0x54, 0x76, 0x98, 0xba,
        0xdc, 0xfe, 0xaa, 0xbb, 0xcc, 0xdd,
    ];

    fn note_record(name: &[u8], desc: &[u8], ntype: u32, little: bool) -> Vec<u8> {
        let put_u32 = |out: &mut Vec<u8>, v: u32| {
            if little {
                out.extend_from_slice(&v.to_le_bytes());
            } else {
                out.extend_from_slice(&v.to_be_bytes());
            }
        };
        let mut out = Vec::new();
        put_u32(&mut out, name.len() as u32);
        put_u32(&mut out, desc.len() as u32);
        put_u32(&mut out, ntype);
        out.extend_from_slice(name);
        out.resize(out.len() + (4 - name.len() % 4) % 4, 0);
        out.extend_from_slice(desc);
        out.resize(out.len() + (4 - desc.len() % 4) % 4, 0);
        out
    }

    /// Minimal 64-bit little-endian image: header, one PT_NOTE program
    /// header, then the note segment itself.
    fn synthetic_elf64_le(notes: &[u8]) -> Vec<u8> {
        let mut image = vec![0u8; 64 + 56];
        image[..4].copy_from_slice(&ELF_MAGIC);
        image[4] = 2; // 64-bit
        image[5] = 1; // little endian
        image[32..40].copy_from_slice(&64u64.to_le_bytes()); // e_phoff
        image[54..56].copy_from_slice(&56u16.to_le_bytes()); // e_phentsize
        image[56..58].copy_from_slice(&1u16.to_le_bytes()); // e_phnum

        let phdr = &mut image[64..];
        phdr[0..4].copy_from_slice(&PT_NOTE.to_le_bytes());
        phdr[8..16].copy_from_slice(&120u64.to_le_bytes()); // p_offset
        phdr[32..40].copy_from_slice(&(notes.len() as u64).to_le_bytes()); // p_filesz

        image.extend_from_slice(notes);
        image
    }

    /// Minimal 32-bit big-endian image, same shape with the narrow layout.
    fn synthetic_elf32_be(notes: &[u8]) -> Vec<u8> {
        let mut image = vec![0u8; 52 + 32];
        image[..4].copy_from_slice(&ELF_MAGIC);
        image[4] = 1; // 32-bit
        image[5] = 2; // big endian
        image[28..32].copy_from_slice(&52u32.to_be_bytes()); // e_phoff
        image[42..44].copy_from_slice(&32u16.to_be_bytes()); // e_phentsize
        image[44..46].copy_from_slice(&1u16.to_be_bytes()); // e_phnum

        let phdr = &mut image[52..];
        phdr[0..4].copy_from_slice(&PT_NOTE.to_be_bytes());
        phdr[4..8].copy_from_slice(&84u32.to_be_bytes()); // p_offset
        phdr[16..20].copy_from_slice(&(notes.len() as u32).to_be_bytes()); // p_filesz

        image.extend_from_slice(notes);
        image
    }

    #[test]
    fn test_extracts_build_id_from_elf64_le() {
        let notes = note_record(b"GNU\0", &BUILD_ID, NT_GNU_BUILD_ID, true);
        let image = synthetic_elf64_le(&notes);
        assert_eq!(
            extract_build_id(&mut Cursor::new(image)),
            Some(hex::encode(BUILD_ID))
        );
    }

    #[test]
    fn test_extracts_build_id_from_elf32_be() {
        let notes = note_record(b"GNU\0", &BUILD_ID, NT_GNU_BUILD_ID, false);
        let image = synthetic_elf32_be(&notes);
        assert_eq!(
            extract_build_id(&mut Cursor::new(image)),
            Some(hex::encode(BUILD_ID))
        );
    }

    #[test]
    fn test_skips_unrelated_notes() {
        // An ABI-tag note first, then the build id. The walker has to step
        // over the first record with correct alignment.
        let mut notes = note_record(b"GNU\0", &[0, 0, 0, 0, 3, 0, 0, 0], 1, true);
        notes.extend_from_slice(&note_record(b"GNU\0", &BUILD_ID, NT_GNU_BUILD_ID, true));
        let image = synthetic_elf64_le(&notes);
        assert_eq!(
            extract_build_id(&mut Cursor::new(image)),
            Some(hex::encode(BUILD_ID))
        );
    }

    #[test]
    fn test_non_elf_input_is_none() {
        assert_eq!(extract_build_id(&mut Cursor::new(b"#!/bin/sh\n".to_vec())), None);
        assert_eq!(extract_build_id(&mut Cursor::new(Vec::new())), None);
    }

    #[test]
    fn test_missing_note_is_none() {
        let image = synthetic_elf64_le(&[]);
        // p_filesz of zero: no notes to walk.
        assert_eq!(extract_build_id(&mut Cursor::new(image)), None);
    }

    #[test]
    fn test_truncated_note_record_is_none() {
        let mut notes = note_record(b"GNU\0", &BUILD_ID, NT_GNU_BUILD_ID, true);
        notes.truncate(notes.len() - 8);
        // The program header still claims the full size, so loading the
        // segment hits EOF and the strategy gives up cleanly.
        let mut image = synthetic_elf64_le(&notes);
        let claimed = notes.len() as u64 + 8;
        image[64 + 32..64 + 40].copy_from_slice(&claimed.to_le_bytes());
        assert_eq!(extract_build_id(&mut Cursor::new(image)), None);
    }

    #[test]
    fn test_oversized_descsz_is_rejected() {
        let mut notes = note_record(b"GNU\0", &BUILD_ID, NT_GNU_BUILD_ID, true);
        // Claim a description far past the end of the segment.
        notes[4..8].copy_from_slice(&u32::MAX.to_le_bytes());
        let image = synthetic_elf64_le(&notes);
        assert_eq!(extract_build_id(&mut Cursor::new(image)), None);
    }
}
