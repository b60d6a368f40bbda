use chip8_vm::{Chip8, Chip8Config, Chip8Error, Chip8Result, DISPLAY_X, DISPLAY_Y, u4};

fn load(rom: &[u8]) -> Chip8 {
    let mut chip8 = Chip8::with_config(Chip8Config {
        rng_seed: Some(8),
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

fn lit_columns(chip8: &Chip8) -> Vec<usize> {
    let mut columns: Vec<usize> = (0..DISPLAY_Y)
        .flat_map(|y| (0..DISPLAY_X).map(move |x| (y, x)))
        .filter(|&(y, x)| chip8.get_display_pixel(y, x))
        .map(|(_, x)| x)
        .collect();
    columns.sort();
    columns.dedup();
    columns
}

#[test]
fn load_then_add_immediate() {
    let mut chip8 = load(&[0x60, 0x0A, 0x70, 0x05]);
    run(&mut chip8, 2);
    assert_eq!(chip8.v()[0], 0x0F);
}

#[test]
fn call_then_return_lands_after_call() {
    let mut chip8 = load(&[0x22, 0x04, 0x00, 0x00, 0x00, 0xEE]);
    run(&mut chip8, 2);
    assert_eq!(chip8.pc(), 0x202);
    assert!(chip8.stack().is_empty());
}

#[test]
fn add_with_carry_sets_vf() {
    // V0 = 0xFF, V1 = 0x01, ADD V0, V1
    let mut chip8 = load(&[0x60, 0xFF, 0x61, 0x01, 0x80, 0x14]);
    run(&mut chip8, 3);
    assert_eq!(chip8.v()[0], 0x00);
    assert_eq!(chip8.v()[0xF], 1);
}

#[test]
fn glyph_at_right_edge_is_clipped_not_wrapped() {
    // V0 = 60, V1 = 0, V2 = 0, LD F, V2, DRW V0, V1, 5
    let mut chip8 = load(&[
        0x60, 0x3C, 0x61, 0x00, 0x62, 0x00, 0xF2, 0x29, 0xD0, 0x15,
    ]);
    run(&mut chip8, 5);
    assert_eq!(lit_columns(&chip8), vec![60, 61, 62, 63]);
    assert_eq!(chip8.v()[0xF], 0);

    // The same glyph two columns further right loses its right half.
    let mut chip8 = load(&[
        0x60, 0x3E, 0x61, 0x00, 0x62, 0x00, 0xF2, 0x29, 0xD0, 0x15,
    ]);
    run(&mut chip8, 5);
    assert_eq!(lit_columns(&chip8), vec![62, 63]);
}

#[test]
fn origin_wraps_around_screen() {
    // V0 = 64 + 1, V1 = 32 + 2, I = glyph 0, DRW V0, V1, 1
    let mut chip8 = load(&[0x60, 0x41, 0x61, 0x22, 0xA0, 0x00, 0xD0, 0x11]);
    run(&mut chip8, 4);
    for x in 1..5 {
        assert!(chip8.get_display_pixel(2, x));
    }
    assert!(!chip8.get_display_pixel(2, 5));
}

#[test]
fn delay_timer_counts_down_to_zero() {
    let mut chip8 = load(&[0x60, 0x05, 0xF0, 0x15]);
    run(&mut chip8, 2);
    assert_eq!(chip8.delay_timer(), 5);

    for _ in 0..5 {
        chip8.tick_timers();
    }
    assert_eq!(chip8.delay_timer(), 0);

    chip8.tick_timers();
    assert_eq!(chip8.delay_timer(), 0);
}

#[test]
fn key_wait_resumes_after_press() {
    // LD V4, K / LD V5, 0x01
    let mut chip8 = load(&[0xF4, 0x0A, 0x65, 0x01]);
    assert_eq!(chip8.execute_cycle().unwrap(), Chip8Result::WaitingForKey);
    assert_eq!(chip8.execute_cycle().unwrap(), Chip8Result::WaitingForKey);
    assert_eq!(chip8.v()[5], 0);

    chip8.set_key(u4::new(0x9), true);
    run(&mut chip8, 2);
    assert_eq!(chip8.v()[4], 0x9);
    assert_eq!(chip8.v()[5], 0x1);
}

#[test]
fn return_without_call_is_a_fault() {
    // 0x200: LD V0, 1 / 0x202: RET
    let mut chip8 = load(&[0x60, 0x01, 0x00, 0xEE]);
    run(&mut chip8, 1);
    assert!(matches!(
        chip8.execute_cycle(),
        Err(Chip8Error::StackUnderflow { address: 0x202 })
    ));
    assert!(chip8.is_halted());
    assert_eq!(chip8.pc(), 0x202);
}

#[test]
fn program_cannot_overwrite_font() {
    // 0x200: LD I, 0x000 / LD V0, 0x12 / LD [I], V0 / LD V0, 0 / LD F, V0 / DRW V1, V1, 5
    let mut chip8 = load(&[
        0xA0, 0x00, 0x60, 0x12, 0xF0, 0x55, 0x60, 0x00, 0xF0, 0x29, 0xD1, 0x15,
    ]);
    run(&mut chip8, 6);
    assert!(!chip8.is_halted());
    // Glyph "0" is still intact and draws its usual outline
    assert_eq!(&chip8.memory()[..5], &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
    let lit = chip8.display().iter().flatten().filter(|&&p| p).count();
    assert_eq!(lit, 14);
    assert!(chip8.get_display_pixel(0, 0));
    assert!(!chip8.get_display_pixel(1, 1));
}

#[test]
fn pc_wraps_at_end_of_memory() {
    let mut rom = vec![0; 0xE00];
    // 0x200: JP 0xFFE
    rom[0] = 0x1F;
    rom[1] = 0xFE;
    // 0xFFE: SE V0, 0x00 (always skips)
    rom[0xDFE] = 0x30;
    rom[0xDFF] = 0x00;
    let mut chip8 = load(&rom);
    run(&mut chip8, 2);
    assert_eq!(chip8.pc(), 0x002);
}
