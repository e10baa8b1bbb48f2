mod counting;
mod vptree_build;
