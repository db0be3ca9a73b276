mod generation;
mod lesson;
mod offline;
