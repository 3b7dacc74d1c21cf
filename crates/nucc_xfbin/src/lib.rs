//! This library handles reading and losslessly rebuilding **NUCC** containers (`.xfbin`) used by
//! CyberConnect2 games.
//!
//! # NUCC Container Format Documentation
//!
//! A NUCC container bundles several typed sub-resources (models, texture packs and assorted
//! binary blobs) into a single file. Only models and texture packs are decoded; everything else
//! is kept as raw bytes, so a container that was decoded and not edited rebuilds to the exact
//! same bytes.
//!
//! ## File Structure
//!
//! A container consists of a header, three string pools, two padding regions and the record area.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: 0x4E554343 ("NUCC")                               |
//! | 0x0004         | Padding flag           | 4 bytes: 0x4F or 0x3F, selects the layout constants        |
//! | 0x0008         | Reserved               | 8 bytes                                                    |
//! | 0x0010         | First record base      | 4 bytes: base offset of the record area                    |
//! | 0x0014         | Unknown                | 4 bytes                                                    |
//! | 0x0018         | Flag echo              | 2 bytes: usually repeats the padding flag                  |
//! | 0x001A         | Unknown                | 2 bytes                                                    |
//! | 0x001C         | Property Count         | 4 bytes: Number of strings in the property pool            |
//! | 0x0020         | Property Block Size    | 4 bytes: Size of the property pool                         |
//! | 0x0024         | Directory Count        | 4 bytes: Number of directory strings plus one              |
//! | 0x0028         | File Name Block Size   | 4 bytes: Size of the directory pool                        |
//! | 0x002C         | File Name Count        | 4 bytes: Number of file name strings plus one              |
//! | 0x0030         | First Padding Offset   | 4 bytes: Offset of the first padding region                |
//! | 0x0034         | Unknown                | 4 bytes                                                    |
//! | 0x0038         | First Padding Size     | 4 bytes: Size of the first padding region                  |
//! | 0x003C         | Second Padding Count   | 4 bytes: Size of the second padding region in 4 byte units |
//! | 0x0040         | Extra Slot Count       | 4 bytes: Number of 8 byte slots before the first record    |
//!
//! The first record starts at `base + 0x1C + padding + 8 * extra slots`, where the padding is
//! `0xC` for flag `0x3F` and `0x18` otherwise.
//!
//! ### String Pools
//!
//! Starting at `0x44` the property names, directory paths and file names are stored as null
//! terminated strings. The directory and file name pools each begin with an empty entry. The
//! pools are padded to a multiple of 4 bytes and followed by 12 bytes and both padding regions.
//!
//! Texture records take their names from the directory pool: the n-th texture is named after the
//! last path component of the n-th directory.
//!
//! ### Records
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Head Size              | 4 bytes: Size of the record after this 12 byte header   |
//! | 0x0004         | Index                  | 4 bytes                                                 |
//! | 0x0008         | Padding Flag           | 4 bytes                                                 |
//! | 0x000C         | Payload Length         | 4 bytes, possibly preceded by nested length fields      |
//!
//! Head sizes of `0`, `8` and `0x2A` mark filler chunks. Large records may hold nested length
//! fields in front of the payload length; the true length is found by probing candidates against
//! the head size. Model payloads (`NDP3`) are followed by a group table: a 2 byte count and that
//! many 4 byte group codes. Texture packs (`NTP3`) declare their width and height 10 bytes in
//! front of the payload.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.xfbin`
//! - **Endianness**: Big-endian for all multi-byte integers
//! - **Packed containers**: files starting with `CPK` must be extracted first
//!

pub mod dispatch;
pub mod error;
pub mod header;
pub mod read;
pub mod record;
mod scan;
pub mod strings;
pub mod textures;
pub mod types;
mod write;

pub use dispatch::{Dispatcher, RawCodec, ResourceCodec, ResourceKind};
pub use read::{Container, DecodeOptions, RecordSummary};
pub use record::Record;
pub use textures::TextureTable;
