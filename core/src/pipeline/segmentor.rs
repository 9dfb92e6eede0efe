//! Segmentor: builds a [`Composition`] from raw input via a [`Syllabifier`].
//!
//! The teacher has no standalone segmentation stage (`Engine` in
//! `engine.rs` segments and scores in one DP pass); splitting it out lets
//! the translator stage below query the graph independently per segment,
//! matching spec.md's "segment-until-fixed-point, translate-per-segment"
//! pipeline shape.

use crate::composition::Composition;
use crate::syllabifier::{SyllableGraph, Syllabifier};

pub struct Segmentor<'a> {
    syllabifier: Syllabifier<'a>,
}

impl<'a> Segmentor<'a> {
    pub fn new(syllabifier: Syllabifier<'a>) -> Self {
        Self { syllabifier }
    }

    /// Build the syllable graph for `input` and seed a flat composition
    /// with one segment per longest-normal-edge hop (the initial guess;
    /// the translator stage may later confirm a different split).
    pub fn segment(&self, input: &str) -> (SyllableGraph, Composition) {
        let graph = self.syllabifier.build(input);
        let mut composition = Composition::from_text(input.to_string());

        let mut pos = 0;
        while pos < graph.interpreted_length {
            let Some(ends) = graph.edges.get(&pos) else { break };
            let Some(&farthest_end) = ends.keys().max() else { break };
            composition.add_segment(pos..farthest_end);
            pos = farthest_end;
        }
        if pos < input.len() {
            composition.add_segment(pos..input.len());
        }

        (graph, composition)
    }
}
