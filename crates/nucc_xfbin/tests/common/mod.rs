#![allow(dead_code)]

use binrw::BinWrite;
use byteorder::{BigEndian, WriteBytesExt};
use nucc_xfbin::types::NuccHeader;
use std::io::{Cursor, Write};

/// Bytes between the first record base and the first record for flag `0x4F`
const RECORD_BASE_GAP: usize = 0x1C + 0x18;

/// Builds small containers in memory
#[derive(Debug, Default)]
pub struct XfbinBuilder {
    properties: Vec<String>,
    directories: Vec<String>,
    file_names: Vec<String>,
    records: Vec<u8>,
    next_index: i32,
}

impl XfbinBuilder {
    pub fn new() -> Self {
        XfbinBuilder {
            properties: vec!["nuccChunkNull".into()],
            file_names: vec!["Page0".into()],
            ..Default::default()
        }
    }

    pub fn property(mut self, name: &str) -> Self {
        self.properties.push(name.into());
        self
    }

    pub fn directory(mut self, name: &str) -> Self {
        self.directories.push(name.into());
        self
    }

    pub fn file_name(mut self, name: &str) -> Self {
        self.file_names.push(name.into());
        self
    }

    fn record_header(&mut self, head_size: usize) {
        self.next_index += 1;
        self.records
            .write_i32::<BigEndian>(head_size as i32)
            .unwrap();
        self.records.write_i32::<BigEndian>(self.next_index).unwrap();
        self.records.write_i32::<BigEndian>(0x63).unwrap();
    }

    fn group_table(&mut self, groups: &[i32]) {
        self.records
            .write_u16::<BigEndian>(groups.len() as u16)
            .unwrap();
        for code in groups {
            self.records.write_i32::<BigEndian>(*code).unwrap();
        }
    }

    /// A model whose head size only covers its payload
    pub fn model(mut self, body: &[u8], groups: &[i32]) -> Self {
        let payload = [b"NDP3".as_slice(), body].concat();
        self.record_header(payload.len() + 4);
        self.records
            .write_i32::<BigEndian>(payload.len() as i32)
            .unwrap();
        self.records.write_all(&payload).unwrap();
        self.group_table(groups);
        self
    }

    /// A `0x220` byte model with a nested length and block in front of the payload
    pub fn nested_model(mut self, groups: &[i32]) -> Self {
        let head_size = 0x220;
        let payload_len = head_size - (8 + 0x18 + 2 + 4 * groups.len());

        let mut payload = b"NDP3".to_vec();
        payload.resize(payload_len, 0x5A);

        self.record_header(head_size);
        self.records.write_i32::<BigEndian>(0x100).unwrap();
        self.records
            .write_i32::<BigEndian>(payload_len as i32)
            .unwrap();
        self.records.write_all(&[0x01; 0x18]).unwrap();
        self.records.write_all(&payload).unwrap();
        self.group_table(groups);
        self
    }

    /// A `0x200` byte texture pack behind two nested fields holding its dimensions
    pub fn texture(mut self, width: i16, height: i16, body: &[u8]) -> Self {
        let mut payload = [b"NTP3".as_slice(), body].concat();
        payload.resize(payload.len().max(0x200), 0x00);

        self.record_header(payload.len() + 12);
        self.records
            .write_i32::<BigEndian>(width as u16 as i32)
            .unwrap();
        self.records
            .write_i32::<BigEndian>(((height as u16 as u32) << 16) as i32)
            .unwrap();
        self.records
            .write_i32::<BigEndian>(payload.len() as i32)
            .unwrap();
        self.records.write_all(&payload).unwrap();
        self
    }

    /// Any payload that is kept as raw bytes
    pub fn blob(mut self, payload: &[u8]) -> Self {
        self.record_header(payload.len() + 4);
        self.records
            .write_i32::<BigEndian>(payload.len() as i32)
            .unwrap();
        self.records.write_all(payload).unwrap();
        self
    }

    /// A `0x2A` filler chunk
    pub fn filler(mut self) -> Self {
        self.records.write_i32::<BigEndian>(0x2A).unwrap();
        self.records.write_all(&[0x00; 0x32]).unwrap();
        self
    }

    fn pools(&self) -> (Vec<u8>, [usize; 3]) {
        let mut pools = Vec::new();
        for name in &self.properties {
            pools.extend_from_slice(name.as_bytes());
            pools.push(0);
        }
        let property_block = pools.len();

        pools.push(0);
        for name in &self.directories {
            pools.extend_from_slice(name.as_bytes());
            pools.push(0);
        }
        let directory_block = pools.len() - property_block;

        pools.push(0);
        for name in &self.file_names {
            pools.extend_from_slice(name.as_bytes());
            pools.push(0);
        }
        pools.extend_from_slice(b"index\0");
        let file_name_block = pools.len() - property_block - directory_block;

        while (0x44 + pools.len()) % 4 != 0 {
            pools.push(0);
        }
        pools.extend_from_slice(&[0x00; 12]);

        (pools, [property_block, directory_block, file_name_block])
    }

    /// Offset of the first record in the built container
    pub fn first_record_start(&self) -> usize {
        0x44 + self.pools().0.len()
    }

    /// Assemble the container, closing it with a page filler
    pub fn build(self) -> Vec<u8> {
        let (pools, [property_block, directory_block, file_name_block]) = self.pools();
        let first_record_start = 0x44 + pools.len();

        let header = NuccHeader {
            padding_flag: 0x4F,
            reserved: [0x00; 8],
            first_record_base: (first_record_start - RECORD_BASE_GAP) as i32,
            unknown_14: 3,
            flag_echo: 0x4F,
            unknown_1a: 0,
            property_count: self.properties.len() as i32,
            property_block_size: property_block as i32,
            directory_count: self.directories.len() as i32 + 1,
            file_name_block_size: directory_block as i32,
            file_name_count: self.file_names.len() as i32 + 2,
            first_padding_offset: file_name_block as i32,
            unknown_34: self.file_names.len() as i32 + 2,
            first_padding_size: 0,
            second_padding_count: 0,
            extra_slot_count: 0,
        };

        let mut out = Cursor::new(Vec::new());
        header.write(&mut out).unwrap();
        out.write_all(&pools).unwrap();
        out.write_all(&self.records).unwrap();

        // page filler without its trailing chunk header
        out.write_i32::<BigEndian>(8).unwrap();
        out.write_all(&[0x00; 0x10]).unwrap();

        out.into_inner()
    }
}
