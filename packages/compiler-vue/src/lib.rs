//! Single-file component target: a `<template>`, an options-API `<script>`
//! carrying the page data and a `<style scoped>` block.

mod compiler;

pub use compiler::{compile_to_vue, CompileError, CompileOptions};

#[cfg(test)]
mod tests;
