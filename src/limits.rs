use alloc::format;

use crate::error::JxrError;

/// Resource caps for a decode. Unset fields impose no limit.
///
/// The input cap is checked before the engine sees the payload, geometry
/// caps once the engine reports the image size, and the memory cap before
/// the native scratch and canonical output buffers are allocated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    /// Largest encoded payload accepted, in bytes.
    pub max_input_bytes: Option<u64>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Scratch rows at the native stride plus the 32bpp output, together.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    pub(crate) fn check_input(&self, len: usize) -> Result<(), JxrError> {
        match self.max_input_bytes {
            Some(max) if len as u64 > max => Err(JxrError::LimitExceeded(format!(
                "input of {len} bytes exceeds limit {max}"
            ))),
            _ => Ok(()),
        }
    }

    pub(crate) fn check_geometry(&self, width: u32, height: u32) -> Result<(), JxrError> {
        if let Some(max) = self.max_width.filter(|&m| width > m) {
            return Err(JxrError::LimitExceeded(format!(
                "width {width} exceeds limit {max}"
            )));
        }
        if let Some(max) = self.max_height.filter(|&m| height > m) {
            return Err(JxrError::LimitExceeded(format!(
                "height {height} exceeds limit {max}"
            )));
        }
        let pixels = u64::from(width) * u64::from(height);
        if let Some(max) = self.max_pixels.filter(|&m| pixels > m) {
            return Err(JxrError::LimitExceeded(format!(
                "{width}x{height} is {pixels} pixels, limit {max}"
            )));
        }
        Ok(())
    }

    pub(crate) fn check_buffers(&self, scratch: usize, output: usize) -> Result<(), JxrError> {
        let total = (scratch as u64).saturating_add(output as u64);
        match self.max_memory_bytes {
            Some(max) if total > max => Err(JxrError::LimitExceeded(format!(
                "scratch {scratch} + output {output} bytes exceeds memory limit {max}"
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unlimited() {
        let l = Limits::default();
        assert!(l.check_input(usize::MAX).is_ok());
        assert!(l.check_geometry(u32::MAX, u32::MAX).is_ok());
        assert!(l.check_buffers(usize::MAX, usize::MAX).is_ok());
    }

    #[test]
    fn input_cap() {
        let l = Limits {
            max_input_bytes: Some(100),
            ..Default::default()
        };
        assert!(l.check_input(100).is_ok());
        assert!(matches!(l.check_input(101), Err(JxrError::LimitExceeded(_))));
    }

    #[test]
    fn each_geometry_cap_applies() {
        let l = Limits {
            max_width: Some(8),
            max_height: Some(4),
            max_pixels: Some(24),
            ..Default::default()
        };
        assert!(l.check_geometry(6, 4).is_ok());
        assert!(l.check_geometry(8, 3).is_ok());
        assert!(matches!(l.check_geometry(9, 1), Err(JxrError::LimitExceeded(_))));
        assert!(matches!(l.check_geometry(1, 5), Err(JxrError::LimitExceeded(_))));
        assert!(matches!(l.check_geometry(7, 4), Err(JxrError::LimitExceeded(_))));
    }

    #[test]
    fn buffer_cap_counts_both_buffers() {
        let l = Limits {
            max_memory_bytes: Some(112),
            ..Default::default()
        };
        assert!(l.check_buffers(48, 64).is_ok());
        assert!(matches!(l.check_buffers(49, 64), Err(JxrError::LimitExceeded(_))));
        assert!(matches!(
            l.check_buffers(usize::MAX, usize::MAX),
            Err(JxrError::LimitExceeded(_))
        ));
    }
}
