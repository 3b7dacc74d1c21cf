mod common;

use common::XfbinBuilder;
use nucc_xfbin::{
    dispatch::OpaqueKind,
    error::{CodecError, Error, Warning},
    Container, Dispatcher, RawCodec, Record, ResourceCodec, ResourceKind, TextureTable,
};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

fn character() -> Vec<u8> {
    XfbinBuilder::new()
        .property("nuccChunkModel")
        .property("nuccChunkTexture")
        .directory("c/1nrt/tex/1nrtbod1.nut")
        .directory("c\\1nrt\\tex\\1nrteye.nut")
        .file_name("1nrtbod1")
        .file_name("1nrt_hair")
        .file_name("1nrt_face")
        .file_name("1nrttrall")
        .file_name("spine 01")
        .model(&[0x00, 0x01, 0x02, 0x03], &[0x11, 0x22])
        .filler()
        .texture(0x100, 0x80, b"body")
        .blob(b"<?xml version=\"1.0\"?><anm/>")
        .texture(0x40, 0x40, b"eye")
        .build()
}

fn decode(bytes: Vec<u8>) -> Result<Container<RawCodec, RawCodec>, Error> {
    Container::decode(bytes, RawCodec::model(), RawCodec::texture())
}

/// Rejects texture packs whose body starts with `bad`
struct StrictTexture;

impl ResourceCodec for StrictTexture {
    type Resource = Vec<u8>;

    fn decode(&self, payload: &[u8]) -> Result<Vec<u8>, CodecError> {
        if payload[4..].starts_with(b"bad") {
            return Err(CodecError::Malformed("bad texture header".into()));
        }
        Ok(payload.to_vec())
    }

    fn encode(&self, resource: &Vec<u8>) -> Result<Vec<u8>, CodecError> {
        Ok(resource.clone())
    }
}

#[traced_test]
#[test]
fn decode_records_in_order() -> Result<(), Error> {
    let xfbin = decode(character())?;

    assert!(xfbin.warnings().is_empty());
    assert_eq!(
        xfbin.records().map(|r| r.kind).collect::<Vec<_>>(),
        vec![
            ResourceKind::Model,
            ResourceKind::Opaque(OpaqueKind::Filler),
            ResourceKind::Texture,
            ResourceKind::Opaque(OpaqueKind::Xml),
            ResourceKind::Texture,
            ResourceKind::Opaque(OpaqueKind::Filler),
        ]
    );
    assert_eq!(xfbin.len(), 6);

    assert_eq!(
        xfbin
            .records()
            .filter_map(|r| r.name)
            .collect::<Vec<_>>(),
        vec!["1nrtbod1.nut", "1nrteye.nut"]
    );

    match xfbin.record(0) {
        Some(Record::Model(model)) => {
            assert_eq!(model.resource, b"NDP3\x00\x01\x02\x03".to_vec());
            assert_eq!(model.group_codes, vec![0x11, 0x22]);
            assert_eq!(model.original_group_count(), 2);
        }
        other => panic!("expected a model, found {other:?}"),
    }

    match xfbin.record(2) {
        Some(Record::Texture(texture)) => {
            assert_eq!((texture.width, texture.height), (0x100, 0x80));
            assert_eq!(texture.resource.len(), 0x200);
            assert!(texture.resource.starts_with(b"NTP3body"));
        }
        other => panic!("expected a texture, found {other:?}"),
    }

    Ok(())
}

#[test]
fn decode_string_pools() -> Result<(), Error> {
    let xfbin = decode(character())?;
    let pools = xfbin.pools();

    assert_eq!(
        pools.properties,
        vec!["nuccChunkNull", "nuccChunkModel", "nuccChunkTexture"]
    );
    assert_eq!(
        pools.directories,
        vec!["c/1nrt/tex/1nrtbod1.nut", "c\\1nrt\\tex\\1nrteye.nut"]
    );
    assert_eq!(
        pools.file_names,
        vec!["1nrtbod1", "1nrt_hair", "1nrt_face", "1nrttrall", "spine 01"]
    );
    assert_eq!(pools.bone_names, vec!["spine 01"]);
    assert_eq!(pools.group_name(0x11), Some("hair"));
    assert_eq!(pools.group_name(0x22), Some("face"));

    Ok(())
}

#[traced_test]
#[test]
fn decode_nested_model_length() -> Result<(), Error> {
    let builder = XfbinBuilder::new().nested_model(&[1, 2, 3]);
    let first_record_start = builder.first_record_start() as u64;
    let xfbin = decode(builder.build())?;

    assert!(xfbin.warnings().is_empty());
    match xfbin.record(0) {
        Some(Record::Model(model)) => {
            let layout = model.layout();
            assert_eq!(layout.header_offset, first_record_start);
            assert_eq!(layout.length_field_offset, Some(first_record_start + 16));
            assert_eq!(layout.payload_offset, first_record_start + 20 + 0x18);
            assert_eq!(layout.payload_len, 0x1F2);
            assert_eq!(model.group_codes, vec![1, 2, 3]);
        }
        other => panic!("expected a model, found {other:?}"),
    }
    assert!(matches!(
        xfbin.record(1),
        Some(Record::Opaque(o)) if o.kind == OpaqueKind::Filler
    ));

    Ok(())
}

#[traced_test]
#[test]
fn drop_corrupt_texture() -> Result<(), Error> {
    let bytes = XfbinBuilder::new()
        .directory("c/1nrt/tex/1nrtbod1.nut")
        .directory("c/1nrt/tex/1nrteye.nut")
        .texture(0x100, 0x100, b"ok")
        .texture(0x100, 0x100, b"bad")
        .blob(&[0x00, 0x00, 0x03, 0xE8, 0xFF])
        .build();

    let xfbin = Container::decode_with(
        bytes,
        Dispatcher::new(RawCodec::model(), StrictTexture),
        Default::default(),
    )?;

    assert_eq!(
        xfbin.records().map(|r| r.kind).collect::<Vec<_>>(),
        vec![
            ResourceKind::Texture,
            ResourceKind::Opaque(OpaqueKind::Binary),
            ResourceKind::Opaque(OpaqueKind::Filler),
        ]
    );
    assert!(matches!(
        xfbin.warnings(),
        [Warning::SubResourceDecode {
            kind: ResourceKind::Texture,
            ..
        }]
    ));
    assert!(logs_contain("dropped texture record"));

    Ok(())
}

#[traced_test]
#[test]
fn capture_truncated_record() -> Result<(), Error> {
    let builder = XfbinBuilder::new()
        .model(&[0x00; 4], &[0x11, 0x22])
        .filler()
        .texture(0x100, 0x80, b"body");
    let texture_start = builder.first_record_start() + 34 + 0x36;

    let mut bytes = builder.build();
    bytes.truncate(texture_start + 100);
    let len = bytes.len() as u64;

    let xfbin = decode(bytes)?;

    assert_eq!(xfbin.len(), 3);
    match xfbin.record(2) {
        Some(Record::Opaque(opaque)) => {
            assert_eq!(opaque.kind, OpaqueKind::Truncated);
            assert_eq!(opaque.start, texture_start as u64);
            assert_eq!(opaque.length, len - texture_start as u64 + 0xC);
        }
        other => panic!("expected a truncated record, found {other:?}"),
    }
    assert!(matches!(
        xfbin.warnings(),
        [Warning::OutOfData { offset }] if *offset == texture_start as u64
    ));

    Ok(())
}

#[traced_test]
#[test]
fn report_ambiguous_group_names() -> Result<(), Error> {
    let xfbin = decode(
        XfbinBuilder::new()
            .file_name("1nrtbod1")
            .file_name("1nrt_hair")
            .file_name("2nrt_hair")
            .file_name("3nrt_hair")
            .model(&[0x00; 4], &[0x11, 0x22])
            .build(),
    )?;

    assert!(matches!(
        xfbin.warnings(),
        [Warning::GroupNameHeuristic { .. }]
    ));
    assert!(xfbin.pools().group_names.is_empty());
    assert_eq!(xfbin.pools().group_name(0x11), None);

    // the model itself is unaffected
    match xfbin.record(0) {
        Some(Record::Model(model)) => assert_eq!(model.group_codes, vec![0x11, 0x22]),
        other => panic!("expected a model, found {other:?}"),
    }

    Ok(())
}

#[traced_test]
#[test]
fn report_unresolved_record_length() -> Result<(), Error> {
    let builder = XfbinBuilder::new().blob(&[0xAB; 0x200]);
    let start = builder.first_record_start();
    let mut bytes = builder.build();
    // no length field matches the head size of 0x204
    bytes[start + 12..start + 16].copy_from_slice(&0x7777_7777i32.to_be_bytes());

    let xfbin = decode(bytes.clone())?;

    assert!(matches!(
        xfbin.warnings(),
        [Warning::HeuristicExhausted { offset, head_size: 0x204 }] if *offset == start as u64
    ));
    match xfbin.record(0) {
        Some(Record::Opaque(opaque)) => {
            assert_eq!(opaque.kind, OpaqueKind::Unknown);
            assert_eq!(opaque.length, 0x210);
        }
        other => panic!("expected an opaque record, found {other:?}"),
    }
    assert!(matches!(
        xfbin.record(1),
        Some(Record::Opaque(o)) if o.kind == OpaqueKind::Filler
    ));
    assert_eq!(xfbin.rebuild()?, bytes);

    Ok(())
}

#[test]
fn reject_invalid_signature() {
    let mut bytes = character();
    bytes[3] = b'X';

    assert!(matches!(decode(bytes), Err(Error::InvalidFormat)));
}

#[test]
fn reject_packed_container() {
    let mut bytes = b"CPK ".to_vec();
    bytes.resize(0x800, 0x00);

    assert!(matches!(decode(bytes), Err(Error::NeedsExtraction)));
}

#[test]
fn resolve_textures_across_containers() -> Result<(), Error> {
    let character = decode(character())?;
    let support = decode(
        XfbinBuilder::new()
            .directory("c/2sik/tex/1nrteye.nut")
            .directory("c/2sik/tex/2sikbod1.nut")
            .texture(0x20, 0x20, b"eye")
            .texture(0x200, 0x100, b"body")
            .build(),
    )?;

    let mut textures = TextureTable::default();
    assert_eq!(textures.register("1nrt", &character), 2);
    assert_eq!(textures.register("2sik", &support), 1);
    assert_eq!(textures.len(), 3);

    let eye = textures.resolve("1nrteye.nut").unwrap();
    assert_eq!(eye.container, "1nrt");
    assert_eq!(eye.record, 4);
    assert_eq!((eye.width, eye.height), (0x40, 0x40));

    let body = textures.resolve("2sikbod1.nut").unwrap();
    assert_eq!(body.container, "2sik");
    assert_eq!(body.record, 1);

    assert!(textures.resolve("missing.nut").is_none());

    Ok(())
}
