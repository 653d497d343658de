pub mod jpeg_encoder;
