//! Colouring: iteration counts to display colours.

use std::{num::NonZeroU32, rc::Rc};

use bytemuck::{Pod, Zeroable};
use fnv::FnvHashMap;
use log::{debug, trace};

/// [`bytemuck`]-compatible RGBA colour, laid out the way the display texture expects it.
#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    /// Colour of points that never escape.
    pub const INTERIOR: Self = Colour::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/**
Colour for an iteration count: a blue, then green, then red ramp, each `period`
iterations long. Counts at or above `max_iters` are [`Colour::INTERIOR`].
*/
pub fn visualise_rgb(iterations: u32, period: NonZeroU32, max_iters: u32) -> Colour {
    if iterations >= max_iters {
        return Colour::INTERIOR;
    }

    let period = u64::from(period.get());
    let phase = u64::from(iterations) % (period * 3);
    // `phase % period < period`, so this never exceeds 254.
    let value = ((phase % period) * 255 / period) as u8;
    if phase >= period * 2 {
        Colour::rgb(value, 0, 0)
    } else if phase >= period {
        Colour::rgb(0, value, 0)
    } else {
        Colour::rgb(0, 0, value)
    }
}

/// Lookup table from iteration count (`0..=max_iters`) to colour.
#[derive(Clone, Debug, PartialEq)]
pub struct Colourmap {
    period: NonZeroU32,
    max_iters: u32,
    colours: Vec<Colour>,
}

impl Colourmap {
    pub fn new(period: NonZeroU32, max_iters: u32) -> Self {
        trace!("begin Colourmap::new");
        let colours = (0..=max_iters)
            .map(|iterations| visualise_rgb(iterations, period, max_iters))
            .collect();
        trace!("end Colourmap::new");
        Self {
            period,
            max_iters,
            colours,
        }
    }

    pub fn period(&self) -> NonZeroU32 {
        self.period
    }

    pub fn max_iters(&self) -> u32 {
        self.max_iters
    }

    pub fn len(&self) -> usize {
        self.colours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }

    /// Counts past the end of the table are interior.
    pub fn get(&self, iterations: u32) -> Colour {
        self.colours
            .get(iterations as usize)
            .copied()
            .unwrap_or(Colour::INTERIOR)
    }

    pub fn colours(&self) -> &[Colour] {
        &self.colours
    }
}

/**
Colourmaps keyed by `(period, max_iters)`.

A table stays cached only while someone outside the cache still holds it. Each
[`Cache::get`] drops the rest, so a session keeps at most the table it is
switching away from and the one it is switching to.
*/
#[derive(Default)]
pub struct Cache {
    colourmaps: FnvHashMap<(NonZeroU32, u32), Rc<Colourmap>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, period: NonZeroU32, max_iters: u32) -> Rc<Colourmap> {
        let colourmap = self
            .colourmaps
            .entry((period, max_iters))
            .or_insert_with(|| {
                debug!(
                    "building colourmap (period = {}, max_iters = {})",
                    period, max_iters
                );
                Rc::new(Colourmap::new(period, max_iters))
            })
            .clone();

        let before = self.colourmaps.len();
        self.colourmaps
            .retain(|_, colourmap| Rc::strong_count(colourmap) > 1);
        if self.colourmaps.len() < before {
            debug!(
                "evicted {} unused colourmap(s)",
                before - self.colourmaps.len()
            );
        }

        colourmap
    }

    pub fn len(&self) -> usize {
        self.colourmaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colourmaps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).unwrap()
    }

    #[test]
    fn table_has_an_entry_per_count_including_the_cap() {
        for max_iters in [0, 1, 50, 255] {
            let colourmap = Colourmap::new(period(10), max_iters);
            assert_eq!(colourmap.len(), max_iters as usize + 1);
            assert_eq!(colourmap.get(max_iters), Colour::INTERIOR);
        }
    }

    #[test]
    fn last_entry_is_interior_for_any_period() {
        for p in [1, 2, 3, 7, 10, 64, 1000] {
            let colourmap = Colourmap::new(period(p), 50);
            assert_eq!(colourmap.colours()[50], Colour::INTERIOR);
        }
    }

    #[test]
    fn ramp_cycles_blue_green_red() {
        let p = period(10);
        assert_eq!(visualise_rgb(0, p, 50), Colour::rgb(0, 0, 0));
        assert_eq!(visualise_rgb(5, p, 50), Colour::rgb(0, 0, 127));
        assert_eq!(visualise_rgb(9, p, 50), Colour::rgb(0, 0, 229));
        assert_eq!(visualise_rgb(10, p, 50), Colour::rgb(0, 0, 0));
        assert_eq!(visualise_rgb(13, p, 50), Colour::rgb(0, 76, 0));
        assert_eq!(visualise_rgb(21, p, 50), Colour::rgb(25, 0, 0));
        assert_eq!(visualise_rgb(29, p, 50), Colour::rgb(229, 0, 0));
        // second cycle
        assert_eq!(visualise_rgb(35, p, 50), Colour::rgb(0, 0, 127));
    }

    #[test]
    fn counts_at_or_past_the_cap_are_interior() {
        let p = period(10);
        assert_eq!(visualise_rgb(50, p, 50), Colour::INTERIOR);
        assert_eq!(visualise_rgb(51, p, 50), Colour::INTERIOR);
        assert_eq!(Colourmap::new(p, 50).get(10_000), Colour::INTERIOR);
    }

    #[test]
    fn period_of_one_is_dark_but_valid() {
        let colourmap = Colourmap::new(period(1), 6);
        assert!(colourmap
            .colours()
            .iter()
            .all(|colour| colour.r == 0 && colour.g == 0 && colour.b == 0));
    }

    #[test]
    fn cache_reuses_tables() {
        let mut cache = Cache::new();
        let a = cache.get(period(10), 255);
        let b = cache.get(period(10), 255);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let c = cache.get(period(11), 255);
        assert_eq!(c.period(), period(11));
        assert_eq!(cache.len(), 2);

        let d = cache.get(period(10), 100);
        assert_eq!(d.max_iters(), 100);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn cache_drops_tables_nobody_holds() {
        let mut cache = Cache::new();
        let mut current = cache.get(period(10), 1000);
        for p in 11..20 {
            current = cache.get(period(p), 1000);
            // The table being replaced is still held during `get`.
            assert!(cache.len() <= 2);
        }
        assert_eq!(current.period(), period(19));

        // Stepping back one period reuses the table just left.
        let previous = cache.get(period(18), 1000);
        let again = cache.get(period(18), 1000);
        assert!(Rc::ptr_eq(&previous, &again));

        drop((current, previous, again));
        let only = cache.get(period(3), 1000);
        assert_eq!(cache.len(), 1);
        assert_eq!(only.period(), period(3));
    }
}
