use std::collections::HashSet;

use chip8_vm::{Chip8, Chip8Config, DISPLAY_X, DISPLAY_Y};
use proptest::prelude::*;

fn load(rom: &[u8]) -> Chip8 {
    let mut chip8 = Chip8::with_config(Chip8Config {
        rng_seed: Some(0),
        ..Chip8Config::default()
    });
    chip8.load(rom).unwrap();
    chip8
}

fn run(chip8: &mut Chip8, cycles: usize) {
    for _ in 0..cycles {
        chip8.execute_cycle().unwrap();
    }
}

fn place(rom: &mut Vec<u8>, address: usize, bytes: &[u8]) {
    let offset = address - 0x200;
    if rom.len() < offset + bytes.len() {
        rom.resize(offset + bytes.len(), 0);
    }
    rom[offset..offset + bytes.len()].copy_from_slice(bytes);
}

/// Pixels a sprite lights, with the origin wrapped and the body clipped.
fn sprite_pixels(x: u8, y: u8, rows: &[u8]) -> HashSet<(usize, usize)> {
    let (x0, y0) = (x as usize % DISPLAY_X, y as usize % DISPLAY_Y);
    let mut pixels = HashSet::new();
    for (row, byte) in rows.iter().enumerate() {
        for col in 0..8 {
            let (px, py) = (x0 + col, y0 + row);
            if byte & (0x80 >> col) != 0 && px < DISPLAY_X && py < DISPLAY_Y {
                pixels.insert((py, px));
            }
        }
    }
    pixels
}

proptest! {
    #[test]
    fn add_sets_carry(a in any::<u8>(), b in any::<u8>()) {
        let mut chip8 = load(&[0x60, a, 0x61, b, 0x80, 0x14]);
        run(&mut chip8, 3);
        prop_assert_eq!(chip8.v()[0], a.wrapping_add(b));
        prop_assert_eq!(chip8.v()[0xF], u8::from(a as u16 + b as u16 > 255));
    }

    #[test]
    fn sub_sets_not_borrow(a in any::<u8>(), b in any::<u8>()) {
        let mut chip8 = load(&[0x60, a, 0x61, b, 0x80, 0x15]);
        run(&mut chip8, 3);
        prop_assert_eq!(chip8.v()[0], a.wrapping_sub(b));
        prop_assert_eq!(chip8.v()[0xF], u8::from(a >= b));
    }

    #[test]
    fn nested_calls_unwind_to_caller(depth in 1usize..=16) {
        // 0x200: CALL 0x300 / 0x202: JP 0x202
        let mut rom = vec![0x23, 0x00, 0x12, 0x02];
        for level in 0..depth {
            let address = 0x300 + level * 4;
            let first = if level + 1 < depth {
                let next = (0x300 + (level + 1) * 4) as u16;
                0x2000 | next
            } else {
                0x6001
            };
            place(&mut rom, address, &first.to_be_bytes());
            place(&mut rom, address + 2, &[0x00, 0xEE]);
        }

        let mut chip8 = load(&rom);
        run(&mut chip8, 2 * depth + 1);
        prop_assert_eq!(chip8.pc(), 0x202);
        prop_assert!(chip8.stack().is_empty());
        prop_assert_eq!(chip8.v()[0], 1);
    }

    #[test]
    fn draw_flags_any_erased_pixel(
        first in prop::collection::vec(any::<u8>(), 1..=15),
        second in prop::collection::vec(any::<u8>(), 1..=15),
        x1 in any::<u8>(), y1 in any::<u8>(),
        x2 in any::<u8>(), y2 in any::<u8>()
    ) {
        let mut rom = vec![
            0xA3, 0x00, 0x60, x1, 0x61, y1, 0xD0, 0x10 | first.len() as u8,
            0xA3, 0x10, 0x60, x2, 0x61, y2, 0xD0, 0x10 | second.len() as u8,
        ];
        place(&mut rom, 0x300, &first);
        place(&mut rom, 0x310, &second);

        let mut chip8 = load(&rom);
        run(&mut chip8, 4);
        prop_assert_eq!(chip8.v()[0xF], 0);
        run(&mut chip8, 4);

        let before = sprite_pixels(x1, y1, &first);
        let drawn = sprite_pixels(x2, y2, &second);
        let collided = !before.is_disjoint(&drawn);
        prop_assert_eq!(chip8.v()[0xF], u8::from(collided));

        let expected: HashSet<_> = before.symmetric_difference(&drawn).copied().collect();
        for y in 0..DISPLAY_Y {
            for x in 0..DISPLAY_X {
                prop_assert_eq!(chip8.get_display_pixel(y, x), expected.contains(&(y, x)));
            }
        }
    }

    #[test]
    fn bcd_matches_decimal_digits(value in any::<u8>()) {
        let mut chip8 = load(&[0x60, value, 0xA3, 0x00, 0xF0, 0x33]);
        run(&mut chip8, 3);
        prop_assert_eq!(
            &chip8.memory()[0x300..0x303],
            &[value / 100, (value / 10) % 10, value % 10]
        );
    }

    #[test]
    fn store_then_load_round_trips(x in 0u8..16, values in prop::array::uniform16(any::<u8>())) {
        let mut rom = Vec::new();
        for reg in 0..16u8 {
            rom.extend_from_slice(&[0x60 | reg, values[reg as usize]]);
        }
        rom.extend_from_slice(&[0xA4, 0x00, 0xF0 | x, 0x55]);
        for reg in 0..16u8 {
            rom.extend_from_slice(&[0x60 | reg, 0x00]);
        }
        rom.extend_from_slice(&[0xF0 | x, 0x65]);

        let mut chip8 = load(&rom);
        run(&mut chip8, 16 + 2 + 16 + 1);

        let x = x as usize;
        prop_assert_eq!(&chip8.v()[..=x], &values[..=x]);
        prop_assert!(chip8.v()[x + 1..].iter().all(|&v| v == 0));
        prop_assert_eq!(&chip8.memory()[0x400..=0x400 + x], &values[..=x]);
        prop_assert_eq!(chip8.i(), 0x400);
    }
}
