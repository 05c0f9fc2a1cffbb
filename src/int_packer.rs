//! Packs finite-domain variables tightly into a buffer of machine words.
//!
//! Works like a bitfield except the field widths are only known at runtime.
//! Variables are assigned `(bin, bit_offset, bit_width)` triples by a greedy
//! bin-packing pass: sort by descending bit width, then place each variable
//! in the first bin with enough free bits, opening a new bin if none fits.

use crate::error::PlannerError;

pub type Bin = u32;
const BIN_BITS: u32 = Bin::BITS;

#[derive(Debug, Clone, Copy)]
struct VarInfo {
    bin: usize,
    shift: u32,
    mask: Bin,
}

/// Packs/unpacks finite-domain variable assignments into `Bin` buffers.
#[derive(Debug, Clone)]
pub struct IntPacker {
    var_info: Vec<VarInfo>,
    num_bins: usize,
}

fn bits_for_range(range: usize) -> Result<u32, PlannerError> {
    if range == 0 {
        return Err(PlannerError::InputError(
            "variable domain size must be at least 1".to_string(),
        ));
    }
    let bits = if range == 1 {
        1
    } else {
        (usize::BITS - (range - 1).leading_zeros()).max(1)
    };
    if bits > BIN_BITS - 1 {
        return Err(PlannerError::InputError(format!(
            "variable range {range} needs {bits} bits, more than the {} available per bin",
            BIN_BITS - 1
        )));
    }
    Ok(bits)
}

impl IntPacker {
    /// `ranges[i]` is the domain size of variable `i`.
    pub fn new(ranges: &[usize]) -> Result<Self, PlannerError> {
        let widths: Vec<u32> = ranges
            .iter()
            .map(|&range| bits_for_range(range))
            .collect::<Result<_, _>>()?;

        // Sort variable indices by descending width; break ties by index for
        // a deterministic, reproducible packing.
        let mut order: Vec<usize> = (0..widths.len()).collect();
        order.sort_by(|&a, &b| widths[b].cmp(&widths[a]).then(a.cmp(&b)));

        let mut var_info = vec![
            VarInfo {
                bin: 0,
                shift: 0,
                mask: 0,
            };
            widths.len()
        ];
        let mut bin_free_bits: Vec<u32> = Vec::new();

        for var in order {
            let width = widths[var];
            let mut placed = None;
            for (bin_index, &free) in bin_free_bits.iter().enumerate() {
                if free >= width {
                    placed = Some(bin_index);
                    break;
                }
            }
            let bin_index = match placed {
                Some(bin_index) => bin_index,
                None => {
                    bin_free_bits.push(BIN_BITS);
                    bin_free_bits.len() - 1
                }
            };
            let shift = BIN_BITS - bin_free_bits[bin_index];
            bin_free_bits[bin_index] -= width;
            let mask = if width == BIN_BITS {
                Bin::MAX
            } else {
                (1 << width) - 1
            };
            var_info[var] = VarInfo {
                bin: bin_index,
                shift,
                mask,
            };
        }

        Ok(Self {
            var_info,
            num_bins: bin_free_bits.len(),
        })
    }

    pub fn bins_per_state(&self) -> usize {
        self.num_bins
    }

    pub fn get(&self, buffer: &[Bin], var: usize) -> usize {
        let info = self.var_info[var];
        ((buffer[info.bin] >> info.shift) & info.mask) as usize
    }

    pub fn set(&self, buffer: &mut [Bin], var: usize, value: usize) {
        let info = self.var_info[var];
        buffer[info.bin] &= !(info.mask << info.shift);
        buffer[info.bin] |= (value as Bin & info.mask) << info.shift;
    }

    pub fn new_buffer(&self) -> Vec<Bin> {
        vec![0; self.num_bins]
    }
}
