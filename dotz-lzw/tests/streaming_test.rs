//! Streaming contract tests: results must not depend on how the caller
//! slices input and output.

use dotz_lzw::{Session, Status, ZConfig, ZDecoder, ZEncoder, compress, decompress};
use std::io::Cursor;

fn lcg_bytes(size: usize, seed: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut seed = seed;
    for _ in 0..size {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        data.push((seed >> 32) as u8);
    }
    data
}

fn sample(size: usize) -> Vec<u8> {
    let noise = lcg_bytes(size, 7);
    b"lorem ipsum dolor sit amet, consectetur adipiscing elit. "
        .iter()
        .copied()
        .cycle()
        .zip(noise)
        .take(size)
        .enumerate()
        .map(|(i, (t, n))| if i % 23 == 0 { n } else { t })
        .collect()
}

/// Drive an encoder with fixed input and output chunk sizes.
fn encode_chunked(data: &[u8], config: ZConfig, in_chunk: usize, out_chunk: usize) -> Vec<u8> {
    let mut encoder = ZEncoder::new(config).expect("encoder");
    let mut out = Vec::new();
    let mut buf = vec![0u8; out_chunk];
    let mut pos = 0;

    while pos < data.len() {
        let end = (pos + in_chunk).min(data.len());
        let (consumed, produced, _) = encoder
            .advance(&data[pos..end], &mut buf)
            .expect("compression failed");
        out.extend_from_slice(&buf[..produced]);
        pos += consumed;
    }
    loop {
        let (produced, status) = encoder.finish(&mut buf).expect("finish failed");
        out.extend_from_slice(&buf[..produced]);
        if status == Status::StreamEnd {
            break;
        }
    }
    out
}

/// Drive a decoder with fixed input and output chunk sizes.
fn decode_chunked(data: &[u8], in_chunk: usize, out_chunk: usize) -> Vec<u8> {
    let mut decoder = ZDecoder::new();
    let mut out = Vec::new();
    let mut buf = vec![0u8; out_chunk];
    let mut pos = 0;

    while pos < data.len() {
        let end = (pos + in_chunk).min(data.len());
        let (consumed, produced, _) = decoder
            .advance(&data[pos..end], &mut buf)
            .expect("decompression failed");
        out.extend_from_slice(&buf[..produced]);
        pos += consumed;
    }
    loop {
        let (produced, status) = decoder.finish(&mut buf).expect("finish failed");
        out.extend_from_slice(&buf[..produced]);
        if status == Status::StreamEnd {
            break;
        }
    }
    out
}

#[test]
fn test_chunk_size_independence() {
    let data = sample(40_000);
    let config = ZConfig::new(12);
    let reference = compress(&data, config).expect("compression failed");

    for chunk in [1usize, 2, 3, 7, 64, 8191, 8192, 8193, 1 << 20] {
        let out_chunk = chunk.min(4096);
        let encoded = encode_chunked(&data, config, chunk, out_chunk);
        assert_eq!(encoded, reference, "encoder output differs at chunk {chunk}");

        let decoded = decode_chunked(&reference, chunk, out_chunk);
        assert!(decoded == data, "decoder output differs at chunk {chunk}");
    }
}

#[test]
fn test_byte_at_a_time() {
    let data = sample(5_000);
    let encoded = encode_chunked(&data, ZConfig::default(), 1, 1);
    assert_eq!(encoded, compress(&data, ZConfig::default()).expect("compression failed"));
    assert_eq!(decode_chunked(&encoded, 1, 1), data);
}

#[test]
fn test_uneven_chunks_with_resets() {
    // Small width so the dictionary fills and CLEAR codes appear.
    let mut data = sample(60_000);
    data.extend(lcg_bytes(30_000, 3));
    data.extend(sample(60_000));
    let config = ZConfig::new(9);
    let reference = compress(&data, config).expect("compression failed");

    assert_eq!(encode_chunked(&data, config, 1001, 13), reference);
    assert!(decode_chunked(&reference, 97, 4099) == data);
}

#[test]
fn test_totals_match_lengths() {
    let data = sample(20_000);
    let mut encoder = ZEncoder::new(ZConfig::default()).expect("encoder");
    let compressed = dotz_core::Compressor::compress_all(&mut encoder, &data).expect("compress");
    assert_eq!(encoder.total_in(), data.len() as u64);
    assert_eq!(encoder.total_out(), compressed.len() as u64);

    let mut decoder = ZDecoder::new();
    let decompressed =
        dotz_core::Decompressor::decompress_all(&mut decoder, &compressed).expect("decompress");
    assert_eq!(decoder.total_in(), compressed.len() as u64);
    assert_eq!(decoder.total_out(), decompressed.len() as u64);
}

#[test]
fn test_truncated_stream_yields_prefix() {
    let data = sample(10_000);
    let compressed = compress(&data, ZConfig::default()).expect("compression failed");

    for cut in [3, 4, 5, 100, compressed.len() / 2, compressed.len() - 1] {
        let partial = decompress(&compressed[..cut]).expect("truncated decode failed");
        assert!(partial.len() <= data.len());
        assert!(data.starts_with(&partial), "cut at {cut} is not a prefix");
    }
}

#[test]
fn test_stream_helpers_roundtrip() {
    let data = sample(100_000);
    let mut compressed = Vec::new();
    let stats = dotz_lzw::compress_stream(&mut Cursor::new(&data), &mut compressed, ZConfig::new(15))
        .expect("compress_stream failed");
    assert_eq!(stats.bytes_read, data.len() as u64);
    assert_eq!(stats.bytes_written, compressed.len() as u64);

    let mut restored = Vec::new();
    let (stats, config) = dotz_lzw::decompress_stream(&mut Cursor::new(&compressed), &mut restored)
        .expect("decompress_stream failed");
    assert_eq!(config, ZConfig::new(15));
    assert_eq!(stats.bytes_written, data.len() as u64);
    assert!(restored == data);
}

#[test]
fn test_session_drives_both_directions() {
    let data = sample(12_345);
    let mut session = Session::begin_compress(ZConfig::new(11)).expect("session");
    let mut compressed = Vec::new();
    let mut buf = [0u8; 333];
    let mut pos = 0;
    while pos < data.len() {
        let (consumed, produced, _) = session
            .advance(&data[pos..], &mut buf)
            .expect("advance failed");
        compressed.extend_from_slice(&buf[..produced]);
        pos += consumed;
    }
    loop {
        let (produced, status) = session.finish(&mut buf).expect("finish failed");
        compressed.extend_from_slice(&buf[..produced]);
        if status == Status::StreamEnd {
            break;
        }
    }
    assert!(session.is_finished());

    let mut session = Session::begin_decompress();
    assert!(!session.is_compress());
    let mut restored = Vec::new();
    let mut pos = 0;
    while pos < compressed.len() {
        let (consumed, produced, _) = session
            .advance(&compressed[pos..], &mut buf)
            .expect("advance failed");
        restored.extend_from_slice(&buf[..produced]);
        pos += consumed;
    }
    loop {
        let (produced, status) = session.finish(&mut buf).expect("finish failed");
        restored.extend_from_slice(&buf[..produced]);
        if status == Status::StreamEnd {
            break;
        }
    }
    assert_eq!(session.config(), Some(&ZConfig::new(11)));
    assert!(restored == data);
}
