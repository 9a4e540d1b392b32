mod common;

mod tests {
    use proto_face::decoder::{DecodeError, Disposal, FrameDecoder};
    use proto_face::{ByteSource, MAX_SCANLINE_WIDTH, StaticStorage, Storage, composite};

    use weezl::BitOrder;
    use weezl::encode::Encoder;

    use crate::common::{
        CLEAR, END, GifBuilder, RecordingSink, TRANSPARENT_PIXEL_GIF, leak,
        literals_without_clear, noise,
    };

    /// Compress indices the way a GIF encoder does
    fn compress(min_code_size: u8, indices: &[u8]) -> Vec<u8> {
        Encoder::new(BitOrder::Lsb, min_code_size)
            .encode(indices)
            .unwrap()
    }

    /// Decode `bytes` into a row-major frame, checking every row arrives once
    fn decode_frame(bytes: &'static [u8], width: usize, height: usize) -> Vec<u8> {
        let (result, lines) = decode_lines(bytes);
        let info = result.unwrap();
        assert_eq!((usize::from(info.width), usize::from(info.height)), (width, height));
        assert_eq!(lines.len(), height);

        let mut frame = vec![0u8; width * height];
        let mut seen = vec![false; height];
        for (y, pixels) in lines {
            let y = usize::from(y);
            assert!(!seen[y], "row {y} drawn twice");
            seen[y] = true;
            assert_eq!(pixels.len(), width);
            frame[y * width..(y + 1) * width].copy_from_slice(&pixels);
        }
        frame
    }

    /// Rows of `image` in interlaced stream order
    fn interlace(image: &[u8], width: usize, height: usize) -> Vec<u8> {
        let mut stream = Vec::with_capacity(image.len());
        for (start, step) in [(0, 8), (4, 8), (2, 4), (1, 2)] {
            for y in (start..height).step_by(step) {
                stream.extend_from_slice(&image[y * width..(y + 1) * width]);
            }
        }
        stream
    }

    /// Decode `bytes` and record each line as (y, indices)
    fn decode_lines(bytes: &'static [u8]) -> (Result<proto_face::FrameInfo, DecodeError>, Vec<(u16, Vec<u8>)>) {
        let mut storage: StaticStorage<'static, 1> = StaticStorage::new();
        storage.insert("/anims/test.gif", bytes).unwrap();
        let mut source = ByteSource::new();
        let mut decoder = FrameDecoder::new();
        let mut lines = Vec::new();

        let mut file = source.open(&mut storage, "/anims/test.gif").unwrap();
        let result = decoder.decode_first_frame(&mut *file, |line| {
            lines.push((line.y, line.pixels.to_vec()));
        });
        (result, lines)
    }

    #[test]
    fn test_transparent_pixel_draws_nothing() {
        let mut storage: StaticStorage<'static, 1> = StaticStorage::new();
        storage.insert("/anims/dot.gif", &TRANSPARENT_PIXEL_GIF).unwrap();
        let mut source = ByteSource::new();
        let mut decoder = FrameDecoder::new();
        let mut sink = RecordingSink::default();

        let mut file = source.open(&mut storage, "/anims/dot.gif").unwrap();
        let info = decoder
            .decode_first_frame(&mut *file, |line| {
                composite(line, &mut sink);
            })
            .unwrap();

        assert_eq!(info.width, 1);
        assert_eq!(info.height, 1);
        assert_eq!(info.transparent, Some(0));
        assert_eq!(info.disposal, Disposal::Leave);
        assert!(sink.pixels.is_empty());
        assert_eq!(decoder.palette().len(), 2);
    }

    #[test]
    fn test_lines_arrive_top_to_bottom() {
        let gif = GifBuilder::new(2, 3).build(&[0, 1, 2, 3, 1, 1]);
        let (result, lines) = decode_lines(leak(gif));

        let info = result.unwrap();
        assert_eq!(info.width, 2);
        assert_eq!(info.height, 3);
        assert_eq!(info.delay_ms, 100);
        assert!(!info.interlaced);
        assert_eq!(
            lines,
            vec![(0, vec![0, 1]), (1, vec![2, 3]), (2, vec![1, 1])]
        );
    }

    #[test]
    fn test_frame_offset_is_applied() {
        let mut builder = GifBuilder::new(2, 1);
        builder.left = 5;
        builder.top = 7;
        let (result, lines) = decode_lines(leak(builder.build(&[3, 2])));

        let info = result.unwrap();
        assert_eq!((info.left, info.top), (5, 7));
        assert_eq!(lines, vec![(7, vec![3, 2])]);
    }

    #[test]
    fn test_repeated_string_code() {
        // Code 6 is used in the same step that defines it
        let gif = GifBuilder::new(3, 1).build_codes(&[CLEAR, 1, 6, END]);
        let (result, lines) = decode_lines(leak(gif));

        result.unwrap();
        assert_eq!(lines, vec![(0, vec![1, 1, 1])]);
    }

    #[test]
    fn test_interlaced_row_order() {
        let mut builder = GifBuilder::new(1, 4);
        builder.interlaced = true;
        let (result, lines) = decode_lines(leak(builder.build(&[0, 1, 2, 3])));

        assert!(result.unwrap().interlaced);
        let rows: Vec<u16> = lines.iter().map(|(y, _)| *y).collect();
        assert_eq!(rows, vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_graphic_control_values() {
        let mut builder = GifBuilder::new(1, 1);
        builder.transparent = Some(2);
        builder.disposal = 3;
        builder.delay_cs = 25;
        let (result, _) = decode_lines(leak(builder.build(&[1])));

        let info = result.unwrap();
        assert_eq!(info.transparent, Some(2));
        assert_eq!(info.disposal, Disposal::RestorePrevious);
        assert_eq!(info.delay_ms, 250);
    }

    #[test]
    fn test_restore_previous_is_drawn_as_leave() {
        assert_eq!(Disposal::RestorePrevious.effective(), Disposal::Leave);
        assert_eq!(
            Disposal::RestoreBackground.effective(),
            Disposal::RestoreBackground
        );
        assert_eq!(Disposal::from_raw(0), Disposal::Leave);
        assert_eq!(Disposal::from_raw(7), Disposal::Leave);
    }

    #[test]
    fn test_bad_signature() {
        let mut gif = GifBuilder::new(1, 1).build(&[0]);
        gif[0] = b'P';
        let (result, lines) = decode_lines(leak(gif));

        assert_eq!(result, Err(DecodeError::BadSignature));
        assert!(lines.is_empty());
    }

    #[test]
    fn test_truncated_header() {
        let (result, _) = decode_lines(b"GIF89a\x01\x00");
        assert_eq!(result, Err(DecodeError::Truncated));
    }

    #[test]
    fn test_truncated_image_keeps_drawn_lines() {
        // Only the first row's codes are present
        let gif = GifBuilder::new(2, 2).build_codes(&[CLEAR, 1, 2, END]);
        let (result, lines) = decode_lines(leak(gif));

        assert_eq!(result, Err(DecodeError::Truncated));
        assert_eq!(lines, vec![(0, vec![1, 2])]);
    }

    #[test]
    fn test_frame_too_wide() {
        let width = (MAX_SCANLINE_WIDTH + 1) as u16;
        let gif = GifBuilder::new(width, 1).build(&[0]);
        let (result, lines) = decode_lines(leak(gif));

        assert_eq!(result, Err(DecodeError::FrameTooWide(width)));
        assert!(lines.is_empty());
    }

    #[test]
    fn test_trailer_before_image() {
        let mut gif = b"GIF89a\x01\x00\x01\x00\x80\x00\x00".to_vec();
        gif.extend_from_slice(&[0, 0, 0, 255, 255, 255, 0x3B]);
        let (result, _) = decode_lines(leak(gif));

        assert_eq!(result, Err(DecodeError::NoImage));
    }

    #[test]
    fn test_undefined_code() {
        let gif = GifBuilder::new(2, 1).build_codes(&[CLEAR, 1, 7, END]);
        let (result, _) = decode_lines(leak(gif));

        assert_eq!(result, Err(DecodeError::InvalidCode(7)));
    }

    #[test]
    fn test_decoder_is_reusable() {
        let mut storage: StaticStorage<'static, 2> = StaticStorage::new();
        storage
            .insert("/anims/a.gif", leak(GifBuilder::new(1, 1).build(&[1])))
            .unwrap();
        storage
            .insert("/anims/b.gif", leak(GifBuilder::new(2, 1).build(&[3, 2])))
            .unwrap();
        let mut source = ByteSource::new();
        let mut decoder = FrameDecoder::new();

        for (path, width) in [("/anims/a.gif", 1), ("/anims/b.gif", 2), ("/anims/a.gif", 1)] {
            assert!(storage.exists(path));
            let mut file = source.open(&mut storage, path).unwrap();
            let info = decoder.decode_first_frame(&mut *file, |_| {}).unwrap();
            assert_eq!(info.width, width);
        }
    }

    #[test]
    fn test_full_width_noise_with_eight_bit_codes() {
        let (width, height) = (320, 200);
        let image = noise(width * height, 256, 7);
        let mut builder = GifBuilder::new(width as u16, height as u16);
        builder.min_code_size = 8;
        let gif = builder.build_raw(&compress(8, &image));

        assert_eq!(decode_frame(leak(gif), width, height), image);
    }

    #[test]
    fn test_patterned_frame_with_long_strings() {
        let (width, height) = (16, 16);
        let image: Vec<u8> = (0..width * height).map(|i| ((i / 5) % 4) as u8).collect();
        let gif = GifBuilder::new(width as u16, height as u16).build_raw(&compress(2, &image));

        assert_eq!(decode_frame(leak(gif), width, height), image);
    }

    #[test]
    fn test_eight_bit_gradient() {
        let (width, height) = (64, 32);
        let image: Vec<u8> = (0..width * height).map(|i| ((i % width) * 4 + i / width) as u8).collect();
        let mut builder = GifBuilder::new(width as u16, height as u16);
        builder.min_code_size = 8;
        let gif = builder.build_raw(&compress(8, &image));

        assert_eq!(decode_frame(leak(gif), width, height), image);
    }

    #[test]
    fn test_interlaced_encoded_frame() {
        let (width, height) = (37, 29);
        let image = noise(width * height, 4, 11);
        let mut builder = GifBuilder::new(width as u16, height as u16);
        builder.interlaced = true;
        let gif = builder.build_raw(&compress(2, &interlace(&image, width, height)));

        assert_eq!(decode_frame(leak(gif), width, height), image);
    }

    #[test]
    fn test_full_table_continues_without_clear() {
        // 4800 codes: the table fills after 4091 of them, the rest are 12 bits wide
        let (width, height) = (320, 15);
        let image = noise(width * height, 4, 3);
        let gif = GifBuilder::new(width as u16, height as u16)
            .build_raw(&literals_without_clear(2, &image));

        assert_eq!(decode_frame(leak(gif), width, height), image);
    }

    #[test]
    fn test_full_table_with_eight_bit_codes() {
        let (width, height) = (64, 80);
        let image = noise(width * height, 256, 5);
        let mut builder = GifBuilder::new(width as u16, height as u16);
        builder.min_code_size = 8;
        let gif = builder.build_raw(&literals_without_clear(8, &image));

        assert_eq!(decode_frame(leak(gif), width, height), image);
    }

    #[test]
    fn test_invalid_min_code_size() {
        let mut builder = GifBuilder::new(1, 1);
        builder.min_code_size = 9;
        let (result, _) = decode_lines(leak(builder.build(&[0])));

        assert_eq!(result, Err(DecodeError::InvalidCodeSize(9)));
    }
}
