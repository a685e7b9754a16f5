pub mod output_writer;

pub use output_writer::OutputWriter;
