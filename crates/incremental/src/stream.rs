//! Ordered k-way merge over lazy streams.

use crate::data::Stream;
use alloc::vec::Vec;
use core::cmp::Ordering;

/// Merges streams that are each sorted by `compare` into one sorted stream.
///
/// With `distinct`, an item that compares equal to one already yielded is
/// skipped in every stream, so overlapping inputs produce it once. Ties
/// resolve to the earliest stream. Nothing is pulled until the first `next`.
pub fn merge_streams<'a, T, C>(
    streams: Vec<Stream<'a, T>>,
    compare: C,
    distinct: bool,
) -> MergeStreams<'a, T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    MergeStreams {
        streams,
        heads: Vec::new(),
        primed: false,
        compare,
        distinct,
    }
}

/// Iterator returned by [`merge_streams`].
pub struct MergeStreams<'a, T, C> {
    streams: Vec<Stream<'a, T>>,
    heads: Vec<Option<T>>,
    primed: bool,
    compare: C,
    distinct: bool,
}

impl<'a, T, C> MergeStreams<'a, T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    fn min_head(&self) -> Option<usize> {
        let mut min: Option<(usize, &T)> = None;
        for (i, head) in self.heads.iter().enumerate() {
            let Some(head) = head else { continue };
            match min {
                Some((_, current)) if (self.compare)(head, current) != Ordering::Less => {}
                _ => min = Some((i, head)),
            }
        }
        min.map(|(i, _)| i)
    }
}

impl<'a, T, C> Iterator for MergeStreams<'a, T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if !self.primed {
            self.heads = self.streams.iter_mut().map(|s| s.next()).collect();
            self.primed = true;
        }

        let i = self.min_head()?;
        let item = self.heads[i].take()?;
        self.heads[i] = self.streams[i].next();

        if self.distinct {
            for j in 0..self.heads.len() {
                while self.heads[j]
                    .as_ref()
                    .map_or(false, |head| (self.compare)(head, &item) == Ordering::Equal)
                {
                    self.heads[j] = self.streams[j].next();
                }
            }
        }
        Some(item)
    }
}
