use bytestreams::{
    IOError, Readable, SeekOrigin, Seekable, SeekableReadWritable,
    SeekableReadable, SeekableWritable, Writable,
};
use rand::random;

pub fn rand(a: u64, b: u64) -> u64 {
    if a >= b {
        panic!("Empty range for random number");
    }
    a + (random::<u64>() % (b - a))
}

pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + 3) as u8).collect()
}

/// Apply random reads, seeks and skips on a fresh `stream` holding
/// `content`, checking each result against the expected position.
pub fn test_random_reads<S>(stream: &mut S, content: &[u8], max_chunk: usize)
where
    S: SeekableReadable + ?Sized,
{
    let len = content.len() as u64;
    let mut pos = 0u64;

    for _ in 0..500 {
        match rand(0, 5) {
            0 => {
                let n = rand(0, max_chunk as u64 + 1) as usize;
                let mut buf = vec![0u8; n];
                let read = stream.read(&mut buf).unwrap();
                let end = std::cmp::min(pos + n as u64, len);
                assert_eq!(read as u64, end - pos);
                assert_eq!(&buf[..read], &content[pos as usize..end as usize]);
                pos = end;
            }
            1 => {
                let target = rand(0, len + 1);
                assert_eq!(
                    stream.seek(SeekOrigin::Begin, target as i64).unwrap(),
                    target
                );
                pos = target;
            }
            2 => {
                let target = rand(0, len + 1);
                let offset = target as i64 - pos as i64;
                assert_eq!(
                    stream.seek(SeekOrigin::Current, offset).unwrap(),
                    target
                );
                pos = target;
            }
            3 => {
                let n = rand(0, max_chunk as u64 + 1) as usize;
                let skipped = stream.skip(n).unwrap();
                let end = std::cmp::min(pos + n as u64, len);
                assert_eq!(skipped as u64, end - pos);
                pos = end;
            }
            _ => {
                assert!(matches!(
                    stream.seek(SeekOrigin::End, 1),
                    Err(IOError::OutOfRange(_))
                ));
                assert_eq!(stream.position().unwrap(), pos);
                let byte = content.get(pos as usize).copied();
                assert_eq!(stream.read_byte().unwrap(), byte);
                pos = std::cmp::min(pos + 1, len);
            }
        }
        assert_eq!(stream.position().unwrap(), pos);
    }
}

/// Write `content` into a `stream` at random positions in chunks of
/// random sizes such that the final stream content is `content`.
///
/// The stream must start at position 0 and hold no byte past `content`.
/// It is first written front to back, then parts of it are rewritten in
/// place.
pub fn write_randomly<S>(stream: &mut S, content: &[u8], max_chunk: usize)
where
    S: SeekableWritable + ?Sized,
{
    let mut written = 0usize;
    while written < content.len() {
        let n = std::cmp::min(
            rand(1, max_chunk as u64 + 1) as usize,
            content.len() - written,
        );
        assert_eq!(stream.write(&content[written..written + n]).unwrap(), n);
        written += n;
        assert_eq!(stream.position().unwrap(), written as u64);
    }

    for _ in 0..50 {
        let start = rand(0, content.len() as u64) as usize;
        let end = std::cmp::min(
            start + rand(1, max_chunk as u64 + 1) as usize,
            content.len(),
        );
        stream.set_position(start as u64).unwrap();
        assert_eq!(stream.write(&content[start..end]).unwrap(), end - start);
        assert_eq!(stream.position().unwrap(), end as u64);
    }
    assert_eq!(stream.total_size().unwrap(), content.len() as u64);
    stream.seek(SeekOrigin::End, 0).unwrap();
    stream.flush().unwrap();
}

/// Write random chunks into an empty `stream`, then read them back.
pub fn test_read_write<S>(stream: &mut S, max_chunk: usize)
where
    S: SeekableReadWritable + ?Sized,
{
    let content = pattern(3000);
    write_randomly(stream, &content, max_chunk);
    stream.set_position(0).unwrap();
    test_random_reads(stream, &content, max_chunk);
}
