//! Detail mask compositing
//!
//! Packs the luminance of four grayscale maps into the channels of one RGBA
//! mask texture: red = metallic, green = ambient occlusion, blue = detail mask,
//! alpha = smoothness.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::raster::types::{RasterBuffer, Rgba};

/// One value per mask channel, in output channel order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskChannels<T> {
    pub metallic: T,
    pub ambient: T,
    pub detail: T,
    pub smoothness: T,
}

impl<T> MaskChannels<T> {
    pub const NAMES: [&'static str; 4] = ["metallic", "ambient", "detail", "smoothness"];

    /// Applies `f` to every channel in output order, stopping at the first error.
    pub fn try_map<U, F>(self, mut f: F) -> Result<MaskChannels<U>>
    where
        F: FnMut(&'static str, T) -> Result<U>,
    {
        Ok(MaskChannels {
            metallic: f(Self::NAMES[0], self.metallic)?,
            ambient: f(Self::NAMES[1], self.ambient)?,
            detail: f(Self::NAMES[2], self.detail)?,
            smoothness: f(Self::NAMES[3], self.smoothness)?,
        })
    }

    pub fn as_ref(&self) -> MaskChannels<&T> {
        MaskChannels {
            metallic: &self.metallic,
            ambient: &self.ambient,
            detail: &self.detail,
            smoothness: &self.smoothness,
        }
    }

    fn named(&self) -> [(&'static str, &T); 4] {
        [
            (Self::NAMES[0], &self.metallic),
            (Self::NAMES[1], &self.ambient),
            (Self::NAMES[2], &self.detail),
            (Self::NAMES[3], &self.smoothness),
        ]
    }
}

pub struct MaskCompositor;

impl MaskCompositor {
    /// Builds the packed mask. All four inputs must share the metallic map's size;
    /// a mismatch is reported before any output is allocated.
    #[instrument(skip_all, fields(width = inputs.metallic.width(), height = inputs.metallic.height()))]
    pub fn composite(inputs: &MaskChannels<RasterBuffer>) -> Result<RasterBuffer> {
        let expected = inputs.metallic.dimensions();
        for (name, raster) in inputs.named() {
            if raster.dimensions() != expected {
                return Err(PipelineError::DimensionMismatch {
                    name: name.to_string(),
                    expected,
                    found: raster.dimensions(),
                });
            }
        }

        let (width, height) = expected;
        let mut mask = RasterBuffer::new(width, height);
        if mask.is_empty() {
            return Ok(mask);
        }

        mask.pixels_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, px) in row.iter_mut().enumerate() {
                    *px = Rgba::new(
                        to_channel(inputs.metallic.get(x, y).luminance()),
                        to_channel(inputs.ambient.get(x, y).luminance()),
                        to_channel(inputs.detail.get(x, y).luminance()),
                        to_channel(inputs.smoothness.get(x, y).luminance()),
                    );
                }
            });

        debug!("Mask composite complete");
        Ok(mask)
    }
}

fn to_channel(luminance: f64) -> u8 {
    (luminance.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(width: usize, height: usize, value: u8) -> RasterBuffer {
        RasterBuffer::filled(width, height, Rgba::gray(value))
    }

    #[test]
    fn test_uniform_luminances_pack_into_channels() {
        // luminance 0.2, 0.4, 0.6, 0.8
        let inputs = MaskChannels {
            metallic: uniform(2, 2, 51),
            ambient: uniform(2, 2, 102),
            detail: uniform(2, 2, 153),
            smoothness: uniform(2, 2, 204),
        };

        let mask = MaskCompositor::composite(&inputs).unwrap();
        assert_eq!(mask.dimensions(), (2, 2));
        assert!(mask.pixels().iter().all(|&px| px == Rgba::new(51, 102, 153, 204)));
    }

    #[test]
    fn test_each_input_lands_in_its_own_channel() {
        let lit = |slot: usize| {
            let mut values = [0u8; 4];
            values[slot] = 255;
            MaskChannels {
                metallic: uniform(1, 1, values[0]),
                ambient: uniform(1, 1, values[1]),
                detail: uniform(1, 1, values[2]),
                smoothness: uniform(1, 1, values[3]),
            }
        };

        let metallic = MaskCompositor::composite(&lit(0)).unwrap();
        assert_eq!(metallic.get(0, 0), Rgba::new(255, 0, 0, 0));

        let ambient = MaskCompositor::composite(&lit(1)).unwrap();
        assert_eq!(ambient.get(0, 0), Rgba::new(0, 255, 0, 0));

        // detail goes to blue and smoothness to alpha
        let detail = MaskCompositor::composite(&lit(2)).unwrap();
        assert_eq!(detail.get(0, 0), Rgba::new(0, 0, 255, 0));

        let smoothness = MaskCompositor::composite(&lit(3)).unwrap();
        assert_eq!(smoothness.get(0, 0), Rgba::new(0, 0, 0, 255));
    }

    #[test]
    fn test_colour_inputs_reduce_to_luminance() {
        let mut metallic = uniform(3, 1, 0);
        metallic.set(0, 0, Rgba::opaque(255, 255, 255));
        metallic.set(1, 0, Rgba::opaque(0, 255, 0));
        metallic.set(2, 0, Rgba::new(255, 255, 255, 0));

        let inputs = MaskChannels {
            metallic,
            ambient: uniform(3, 1, 0),
            detail: uniform(3, 1, 0),
            smoothness: uniform(3, 1, 255),
        };

        let mask = MaskCompositor::composite(&inputs).unwrap();
        assert_eq!(mask.get(0, 0), Rgba::new(255, 0, 0, 255));
        // 38470 / 65536 of full scale
        assert_eq!(mask.get(1, 0).r, 150);
        assert_eq!(mask.get(2, 0).r, 0);
    }

    #[test]
    fn test_dimension_mismatch_names_offending_input() {
        let inputs = MaskChannels {
            metallic: uniform(4, 4, 0),
            ambient: uniform(4, 4, 0),
            detail: uniform(4, 3, 0),
            smoothness: uniform(4, 4, 0),
        };

        match MaskCompositor::composite(&inputs).unwrap_err() {
            PipelineError::DimensionMismatch { name, expected, found } => {
                assert_eq!(name, "detail");
                assert_eq!(expected, (4, 4));
                assert_eq!(found, (4, 3));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_try_map_visits_in_channel_order() {
        let channels = MaskChannels { metallic: 1, ambient: 2, detail: 3, smoothness: 4 };
        let mut seen = Vec::new();
        let doubled = channels
            .try_map(|name, v| {
                seen.push(name);
                Ok(v * 2)
            })
            .unwrap();
        assert_eq!(doubled, MaskChannels { metallic: 2, ambient: 4, detail: 6, smoothness: 8 });
        assert_eq!(seen, MaskChannels::<i32>::NAMES.to_vec());
    }
}
