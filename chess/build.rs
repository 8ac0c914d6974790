use std::path::Path;
use std::{env, io};

use rand_core::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

pub fn default_gen() -> impl RngCore {
    Xoshiro256PlusPlus::seed_from_u64(0x6A4B_17C0_DE5E_ED42_u64)
}

mod zobrist {
    use std::io::{self, BufWriter, Write};
    use std::{fs, path::Path};

    use gambit_base::geometry;
    use gambit_base::types::{Color, File, Piece, PieceKind, Square};
    use rand_core::RngCore;

    struct Zobrist {
        pieces: [[u64; 64]; Piece::COUNT],
        move_side: u64,
        castling: [u64; 16],
        enpassant: [u64; 64],
        castling_kingside: [u64; 2],
        castling_queenside: [u64; 2],
    }

    fn castling_delta(
        pieces: &[[u64; 64]; Piece::COUNT],
        c: Color,
        king_dst: File,
        rook_src: File,
        rook_dst: File,
    ) -> u64 {
        let rook = Piece::new(c, PieceKind::Rook).index();
        let king = Piece::new(c, PieceKind::King).index();
        let rank = geometry::castling_rank(c);
        pieces[king][Square::from_parts(File::E, rank).index()]
            ^ pieces[king][Square::from_parts(king_dst, rank).index()]
            ^ pieces[rook][Square::from_parts(rook_src, rank).index()]
            ^ pieces[rook][Square::from_parts(rook_dst, rank).index()]
    }

    impl Zobrist {
        fn generate<R: RngCore>(gen: &mut R) -> Zobrist {
            let pieces = {
                let mut res = [[0_u64; 64]; Piece::COUNT];
                for sub in res.iter_mut() {
                    for x in sub {
                        *x = gen.next_u64();
                    }
                }
                res
            };
            // Rights are hashed as a whole, so each subset gets the xor of its flags' keys
            let castling = {
                let base = [(); 4].map(|_| gen.next_u64());
                let mut res = [0_u64; 16];
                for (i, val) in res.iter_mut().enumerate() {
                    for (j, base_val) in base.iter().enumerate() {
                        if (i >> j) & 1 != 0 {
                            *val ^= base_val;
                        }
                    }
                }
                res
            };
            Zobrist {
                pieces,
                move_side: gen.next_u64(),
                castling,
                enpassant: [(); 64].map(|_| gen.next_u64()),
                castling_kingside: [Color::White, Color::Black]
                    .map(|c| castling_delta(&pieces, c, File::G, File::H, File::F)),
                castling_queenside: [Color::White, Color::Black]
                    .map(|c| castling_delta(&pieces, c, File::C, File::A, File::D)),
            }
        }

        fn generate_default() -> Zobrist {
            Self::generate(&mut super::default_gen())
        }

        fn output<W: Write>(&self, w: &mut W) -> io::Result<()> {
            writeln!(w, "const PIECES: [[u64; 64]; Piece::COUNT] = [")?;
            for (i, sub) in self.pieces.iter().enumerate() {
                writeln!(w, "    /*{:2}*/ [", i)?;
                for (i, hsh) in sub.iter().enumerate() {
                    writeln!(w, "        /*{:2}*/ {:#x},", i, hsh)?;
                }
                writeln!(w, "    ],")?;
            }
            writeln!(w, "];\n")?;

            writeln!(w, "pub const MOVE_SIDE: u64 = {:#x};\n", self.move_side)?;

            writeln!(w, "const CASTLING: [u64; 16] = [")?;
            for (i, sub) in self.castling.iter().enumerate() {
                writeln!(w, "    /*{:2}*/ {:#x},", i, sub)?;
            }
            writeln!(w, "];\n")?;

            writeln!(w, "const ENPASSANT: [u64; 64] = [")?;
            for (i, sub) in self.enpassant.iter().enumerate() {
                writeln!(w, "    /*{:2}*/ {:#x},", i, sub)?;
            }
            writeln!(w, "];\n")?;

            writeln!(
                w,
                "const CASTLING_KINGSIDE: [u64; 2] = [{:#x}, {:#x}];",
                self.castling_kingside[0], self.castling_kingside[1]
            )?;
            writeln!(
                w,
                "const CASTLING_QUEENSIDE: [u64; 2] = [{:#x}, {:#x}];",
                self.castling_queenside[0], self.castling_queenside[1]
            )?;

            Ok(())
        }
    }

    pub fn gen(out_path: &Path) -> io::Result<()> {
        Zobrist::generate_default().output(&mut BufWriter::new(&fs::File::create(out_path)?))?;
        Ok(())
    }
}

mod near_attacks {
    use std::io::{self, BufWriter, Write};
    use std::{fs, path::Path};

    use gambit_base::bitboard::Bitboard;
    use gambit_base::types::Square;

    fn generate_directed<const N: usize>(d_file: [isize; N], d_rank: [isize; N]) -> [Bitboard; 64] {
        let mut res = [Bitboard::EMPTY; 64];
        for c in Square::iter() {
            let mut bb = Bitboard::EMPTY;
            for (&delta_file, &delta_rank) in d_file.iter().zip(d_rank.iter()) {
                if let Some(nc) = c.shift(delta_file, delta_rank) {
                    bb.set(nc);
                }
            }
            res[c.index()] = bb;
        }
        res
    }

    pub fn print_bitboards<W: Write>(w: &mut W, name: &str, bs: &[Bitboard; 64]) -> io::Result<()> {
        writeln!(w, "const {}: [Bitboard; 64] = [", name)?;
        for (i, b) in bs.iter().enumerate() {
            writeln!(w, "    /*{:2}*/ bb(0x{:016x}),", i, b.as_raw())?;
        }
        writeln!(w, "];")?;
        Ok(())
    }

    pub fn gen(out_path: &Path) -> io::Result<()> {
        let f = fs::File::create(out_path)?;
        let mut w = BufWriter::new(&f);

        print_bitboards(
            &mut w,
            "KING_ATTACKS",
            &generate_directed([-1, -1, -1, 0, 0, 1, 1, 1], [-1, 0, 1, -1, 1, -1, 0, 1]),
        )?;
        writeln!(&mut w)?;
        print_bitboards(
            &mut w,
            "KNIGHT_ATTACKS",
            &generate_directed([-2, -2, -1, -1, 2, 2, 1, 1], [-1, 1, -2, 2, -1, 1, -2, 2]),
        )?;
        writeln!(&mut w)?;
        print_bitboards(
            &mut w,
            "WHITE_PAWN_ATTACKS",
            &generate_directed([-1, 1], [-1, -1]),
        )?;
        writeln!(&mut w)?;
        print_bitboards(
            &mut w,
            "BLACK_PAWN_ATTACKS",
            &generate_directed([-1, 1], [1, 1]),
        )?;

        Ok(())
    }
}

mod rays {
    use std::io::{self, BufWriter, Write};
    use std::{fs, path::Path};

    use gambit_base::bitboard::Bitboard;
    use gambit_base::types::Square;

    /// Slider directions as `(delta_file, delta_rank)`. The first four increase the square index,
    /// the last four decrease it; `attack.rs` relies on this order.
    const DIRS: [(isize, isize); 8] = [
        (1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
        (-1, 0),
        (1, -1),
        (0, -1),
        (-1, -1),
    ];

    fn generate_ray(delta_file: isize, delta_rank: isize) -> [Bitboard; 64] {
        let mut res = [Bitboard::EMPTY; 64];
        for c in Square::iter() {
            let mut bb = Bitboard::EMPTY;
            let mut p = c;
            while let Some(np) = p.shift(delta_file, delta_rank) {
                bb.set(np);
                p = np;
            }
            res[c.index()] = bb;
        }
        res
    }

    pub fn gen(out_path: &Path) -> io::Result<()> {
        let f = fs::File::create(out_path)?;
        let mut w = BufWriter::new(&f);

        for (i, &(delta_file, delta_rank)) in DIRS.iter().enumerate() {
            super::near_attacks::print_bitboards(
                &mut w,
                &format!("RAY_{}", i),
                &generate_ray(delta_file, delta_rank),
            )?;
            writeln!(&mut w)?;
        }
        writeln!(
            &mut w,
            "const RAYS: [[Bitboard; 64]; 8] = [RAY_0, RAY_1, RAY_2, RAY_3, RAY_4, RAY_5, RAY_6, RAY_7];"
        )?;

        Ok(())
    }
}

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = env::var("OUT_DIR").map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    zobrist::gen(&Path::new(&out_dir).join("zobrist.rs"))?;
    near_attacks::gen(&Path::new(&out_dir).join("near_attacks.rs"))?;
    rays::gen(&Path::new(&out_dir).join("rays.rs"))?;

    Ok(())
}
