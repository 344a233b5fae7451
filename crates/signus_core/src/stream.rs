use std::io::{self, Read, Seek, SeekFrom, Write};

pub struct LittleEndianReader<R> {
    inner: R,
}

impl<R: Read + Seek> LittleEndianReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_i8(&mut self) -> io::Result<i8> {
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf)?;
        Ok(i8::from_le_bytes(buf))
    }

    pub fn read_i32(&mut self) -> io::Result<i32> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    pub fn read_i64(&mut self) -> io::Result<i64> {
        let mut buf = [0u8; 8];
        self.inner.read_exact(&mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    pub fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_bytes(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read a fixed-size field and return the bytes before the first NUL.
    pub fn read_fixed_cstr(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut bytes = self.read_bytes(n)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(n);
        bytes.truncate(end);
        Ok(bytes)
    }

    pub fn skip(&mut self, n: i64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Current(n))?;
        Ok(())
    }

    pub fn position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    pub fn seek_to(&mut self, pos: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    pub fn len(&mut self) -> io::Result<u64> {
        stream_len(&mut self.inner)
    }

    pub fn is_empty(&mut self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }
}

pub struct LittleEndianWriter<W> {
    inner: W,
}

impl<W: Write + Seek> LittleEndianWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_u8(&mut self, v: u8) -> io::Result<()> {
        self.inner.write_all(&[v])
    }

    pub fn write_i8(&mut self, v: i8) -> io::Result<()> {
        self.inner.write_all(&v.to_le_bytes())
    }

    pub fn write_i32(&mut self, v: i32) -> io::Result<()> {
        self.inner.write_all(&v.to_le_bytes())
    }

    pub fn write_i64(&mut self, v: i64) -> io::Result<()> {
        self.inner.write_all(&v.to_le_bytes())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)
    }

    /// Write `bytes` into a fixed-size field, zero-padding the remainder.
    pub fn write_padded(&mut self, bytes: &[u8], n: usize) -> io::Result<()> {
        if bytes.len() > n {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("field of {} bytes does not fit in {n}", bytes.len()),
            ));
        }
        self.inner.write_all(bytes)?;
        self.inner.write_all(&vec![0u8; n - bytes.len()])
    }

    pub fn skip(&mut self, n: i64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Current(n))?;
        Ok(())
    }

    pub fn position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    pub fn len(&mut self) -> io::Result<u64> {
        stream_len(&mut self.inner)
    }

    pub fn is_empty(&mut self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn stream_len<S: Seek>(inner: &mut S) -> io::Result<u64> {
    let cur = inner.stream_position()?;
    let end = inner.seek(SeekFrom::End(0))?;
    inner.seek(SeekFrom::Start(cur))?;
    Ok(end)
}
