use std::path::Path;

use super::LoadError;

/// Reads a raw ROM image from disk. Size is checked later by `Chip8::load`.
pub fn read_rom(path: impl AsRef<Path>) -> Result<Vec<u8>, LoadError> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|source| LoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_unreadable() {
        let path = std::env::temp_dir().join("chip8-vm-this-rom-does-not-exist.ch8");
        let err = read_rom(&path).unwrap_err();
        assert!(matches!(err, LoadError::Unreadable { .. }));
        assert!(err.to_string().contains("chip8-vm-this-rom-does-not-exist.ch8"));
    }

    #[test]
    fn reads_bytes_verbatim() {
        let path = std::env::temp_dir().join(format!("chip8-vm-rom-{}.ch8", std::process::id()));
        std::fs::write(&path, [0x60u8, 0x0A, 0x70, 0x05]).unwrap();
        let rom = read_rom(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(rom, vec![0x60, 0x0A, 0x70, 0x05]);
    }
}
