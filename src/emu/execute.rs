use rand::Rng;

use super::{
    ADDRESS_MASK, Chip8, Chip8Error, Chip8Result, FONT_GLYPH_SIZE, FONT_START_ADDRESS, Opcode,
    OpcodeALU, UnknownOpcodePolicy,
};
use crate::u4;

impl Chip8 {
    /// Runs one decoded instruction fetched from `address`.
    pub(crate) fn execute(
        &mut self,
        address: u16,
        opcode: Opcode,
    ) -> Result<Chip8Result, Chip8Error> {
        self.set_pc(address.wrapping_add(2));

        match opcode {
            Opcode::ClearDisplay => {
                self.display.clear();
                return Ok(Chip8Result::Drew);
            }
            Opcode::Jump { nnn } => {
                self.set_pc(nnn);
            }
            Opcode::JumpWithOffset { nnn } => {
                self.set_pc(nnn.wrapping_add(self.v[0].into()));
            }
            Opcode::Call { nnn } => {
                let capacity = self.stack.capacity();
                self.stack
                    .push(self.pc)
                    .map_err(|_| Chip8Error::StackOverflow { capacity, address })?;
                self.set_pc(nnn);
            }
            Opcode::Return => {
                let return_address = self
                    .stack
                    .pop()
                    .ok_or(Chip8Error::StackUnderflow { address })?;
                self.set_pc(return_address);
            }
            Opcode::SkipRegEqualImm { x, nn } => {
                self.skip_if(self.v[x] == nn);
            }
            Opcode::SkipRegNotEqualImm { x, nn } => {
                self.skip_if(self.v[x] != nn);
            }
            Opcode::SkipRegEqualReg { x, y } => {
                self.skip_if(self.v[x] == self.v[y]);
            }
            Opcode::SkipRegNotEqualReg { x, y } => {
                self.skip_if(self.v[x] != self.v[y]);
            }
            Opcode::SetRegImm { x, nn } => {
                self.v[x] = nn;
            }
            Opcode::AddRegImm { x, nn } => {
                self.v[x] = self.v[x].wrapping_add(nn);
            }
            Opcode::ALU { x, y, op } => {
                self.execute_alu(x, y, op);
            }
            Opcode::Random { x, nn } => {
                let rand_byte: u8 = self.rng.random();
                self.v[x] = rand_byte & nn;
            }
            Opcode::SetIndexImm { nnn } => {
                self.i = nnn;
            }
            Opcode::AddIndexReg { x } => {
                let sum = self.i + u16::from(self.v[x]);
                if sum > ADDRESS_MASK {
                    self.v[0xF] = 1;
                }
                self.i = sum & ADDRESS_MASK;
            }
            Opcode::Draw { x, y, n } => {
                return Ok(self.execute_draw(x, y, n));
            }
            Opcode::SkipIfPressed { x } => {
                let pressed = self.is_key_in_vx_pressed(address, opcode, x);
                self.skip_if(pressed);
            }
            Opcode::SkipIfNotPressed { x } => {
                let pressed = self.is_key_in_vx_pressed(address, opcode, x);
                self.skip_if(!pressed);
            }
            Opcode::WaitForKey { x } => {
                return Ok(self.execute_wait_for_key(address, x));
            }
            Opcode::ReadDelayTimer { x } => {
                self.v[x] = self.timers.delay;
            }
            Opcode::SetDelayTimer { x } => {
                self.timers.delay = self.v[x];
            }
            Opcode::SetSoundTimer { x } => {
                self.timers.sound = self.v[x];
            }
            Opcode::FontChar { x } => {
                let digit = u16::from(self.v[x]);
                self.i = (FONT_START_ADDRESS as u16 + digit * FONT_GLYPH_SIZE) & ADDRESS_MASK;
            }
            Opcode::BCD { x } => {
                let value = self.v[x];
                self.store_bytes(address, opcode, &[value / 100, (value / 10) % 10, value % 10]);
            }
            Opcode::StoreRegs { x } => {
                let regs = self.v;
                self.store_bytes(address, opcode, &regs[..=usize::from(x)]);
                self.advance_index_after_transfer(x);
            }
            Opcode::LoadRegs { x } => {
                for reg_index in 0..=usize::from(x) {
                    self.v[reg_index] = self.memory.read(self.i.wrapping_add(reg_index as u16));
                }
                self.advance_index_after_transfer(x);
            }
            Opcode::Unknown(raw) => match self.config.unknown_opcode_policy {
                UnknownOpcodePolicy::Ignore => {}
                UnknownOpcodePolicy::Warn => {
                    if self.first_diagnostic(address, opcode) {
                        log::warn!("Ignoring unknown opcode {raw:#06X} at {address:#05X}");
                    }
                }
                UnknownOpcodePolicy::Fault => {
                    return Err(Chip8Error::UnknownOpcode {
                        opcode: raw,
                        address,
                    });
                }
            },
        };

        Ok(Chip8Result::Continue)
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.set_pc(self.pc.wrapping_add(2));
        }
    }

    /// The flag is always written last, so VF as a destination holds the flag.
    fn execute_alu(&mut self, x: u4, y: u4, op: OpcodeALU) {
        let shift_operand = if self.config.quirks.shift_uses_vy {
            self.v[y]
        } else {
            self.v[x]
        };

        match op {
            OpcodeALU::Set => self.v[x] = self.v[y],
            OpcodeALU::Or => {
                self.v[x] |= self.v[y];
                self.reset_vf_after_logic();
            }
            OpcodeALU::And => {
                self.v[x] &= self.v[y];
                self.reset_vf_after_logic();
            }
            OpcodeALU::Xor => {
                self.v[x] ^= self.v[y];
                self.reset_vf_after_logic();
            }
            OpcodeALU::Add => {
                let (res, overflow) = self.v[x].overflowing_add(self.v[y]);
                self.v[x] = res;
                self.v[0xF] = u8::from(overflow);
            }
            OpcodeALU::Sub => {
                let (res, borrow) = self.v[x].overflowing_sub(self.v[y]);
                self.v[x] = res;
                self.v[0xF] = u8::from(!borrow); // Notice that borrow is inverted
            }
            OpcodeALU::SubReverse => {
                let (res, borrow) = self.v[y].overflowing_sub(self.v[x]);
                self.v[x] = res;
                self.v[0xF] = u8::from(!borrow);
            }
            OpcodeALU::ShiftRight => {
                self.v[x] = shift_operand >> 1;
                self.v[0xF] = shift_operand & 1;
            }
            OpcodeALU::ShiftLeft => {
                self.v[x] = shift_operand << 1;
                self.v[0xF] = (shift_operand >> 7) & 1;
            }
        }
    }

    fn reset_vf_after_logic(&mut self) {
        if self.config.quirks.logic_resets_vf {
            self.v[0xF] = 0;
        }
    }

    fn execute_draw(&mut self, x: u4, y: u4, n: u4) -> Chip8Result {
        let sprite: Vec<u8> = (0..u16::from(n.get()))
            .map(|row| self.memory.read(self.i.wrapping_add(row)))
            .collect();

        let any_erased = self.display.draw_sprite(self.v[x], self.v[y], &sprite);
        self.v[0xF] = u8::from(any_erased);

        Chip8Result::Drew
    }

    fn execute_wait_for_key(&mut self, address: u16, x: u4) -> Chip8Result {
        match self.keypad.first_pressed() {
            Some(key) => {
                self.v[x] = key.get();
                Chip8Result::Continue
            }
            None => {
                // Repeat this instruction until a key is pressed
                self.set_pc(address);
                Chip8Result::WaitingForKey
            }
        }
    }

    /// Keys only exist for 0x0-0xF; larger values never count as pressed.
    fn is_key_in_vx_pressed(&mut self, address: u16, opcode: Opcode, x: u4) -> bool {
        match u4::try_from(self.v[x]) {
            Ok(key) => self.keypad.is_pressed(key),
            Err(value) => {
                if self.first_diagnostic(address, opcode) {
                    log::warn!("V{x:X} holds {value:#04X} at {address:#05X}, which is not a key");
                }
                false
            }
        }
    }

    /// Writes `bytes` from `I` onwards. Bytes aimed below the program area are dropped.
    fn store_bytes(&mut self, address: u16, opcode: Opcode, bytes: &[u8]) {
        let mut refused = 0;
        for (offset, &byte) in (0u16..).zip(bytes) {
            if !self.memory.write(self.i.wrapping_add(offset), byte) {
                refused += 1;
            }
        }

        if refused > 0 && self.first_diagnostic(address, opcode) {
            log::warn!(
                "{opcode} at {address:#05X} tried to write {refused} byte(s) into the interpreter area, I = {:#05X}",
                self.i
            );
        }
    }

    fn advance_index_after_transfer(&mut self, x: u4) {
        if self.config.quirks.load_store_increments_index {
            self.i = self.i.wrapping_add(u16::from(x.get()) + 1) & ADDRESS_MASK;
        }
    }
}
