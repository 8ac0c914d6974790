use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gambit::{legal, movegen, Color, Game, Position, Square};

const BOARDS: [(&str, &str); 10] = [
    (
        "initial",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    ),
    (
        "sicilian",
        "r1b1k2r/2qnbppp/p2ppn2/1p4B1/3NPPP1/2N2Q2/PPP4P/2KR1B1R w kq - 0 11",
    ),
    (
        "middle",
        "1rq1r1k1/1p3ppp/pB3n2/3ppP2/Pbb1P3/1PN2B2/2P2QPP/R1R4K w - - 1 21",
    ),
    (
        "open_position",
        "4r1k1/3R1ppp/8/5P2/p7/6PP/4pK2/1rN1B3 w - - 4 43",
    ),
    ("queen", "6K1/8/8/1k3q2/3Q4/8/8/8 w - - 0 1"),
    ("pawn_move", "4k3/pppppppp/8/8/8/8/PPPPPPPP/4K3 w - - 0 1"),
    ("pawn_attack", "4k3/8/8/pppppppp/PPPPPPPP/8/8/4K3 w - - 0 1"),
    (
        "pawn_promote",
        "8/PPPPPPPP/8/2k1K3/8/8/pppppppp/8 w - - 0 1",
    ),
    (
        "cydonia",
        "5K2/1N1N1N2/8/1N1N1N2/1n1n1n2/8/1n1n1n2/5k2 w - - 0 1",
    ),
    (
        "max",
        "3Q4/1Q4Q1/4Q3/2Q4R/Q4Q2/3Q4/NR4Q1/kN1BB1K1 w - - 0 1",
    ),
];

fn positions() -> impl Iterator<Item = (&'static str, Position)> {
    BOARDS
        .iter()
        .map(|&(name, fen)| (name, Position::from_fen(fen).unwrap()))
}

fn bench_pseudo_legal(c: &mut Criterion) {
    let mut group = c.benchmark_group("pseudo_legal");
    for (name, pos) in positions() {
        group.bench_function(name, |b| {
            b.iter(|| black_box(movegen::pseudo_legal(&pos).len()))
        });
    }
}

fn bench_legal_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("legal_moves");
    for (name, pos) in positions() {
        group.bench_function(name, |b| {
            b.iter(|| black_box(legal::legal_moves(&pos).len()))
        });
    }
}

fn bench_make_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("make_move");
    for (name, pos) in positions() {
        let moves = legal::legal_moves(&pos);
        group.bench_function(name, |b| {
            b.iter(|| {
                for mv in &moves {
                    black_box(
                        pos.make_move(*mv)
                            .as_ref()
                            .map(|p| p.zobrist_hash())
                            .unwrap_or(0),
                    );
                }
            })
        });
    }
}

fn bench_is_attacked(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_attacked");
    for (name, pos) in positions() {
        group.bench_function(name, |b| {
            b.iter(|| {
                for color in [Color::White, Color::Black] {
                    for sq in Square::iter() {
                        black_box(movegen::is_square_attacked(&pos, sq, color));
                    }
                }
            })
        });
    }
}

fn bench_has_legal_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_legal_moves");
    for (name, pos) in positions() {
        group.bench_function(name, |b| b.iter(|| black_box(pos.has_legal_moves())));
    }
}

fn bench_game(c: &mut Criterion) {
    let moves = "e2e4 e7e5 g1f3 b8c6 f1b5 a7a6 b5a4 g8f6 e1g1 f8e7 f1e1 b7b5 a4b3 d7d6 c2c3 e8g8";
    c.bench_function("game_uci_list", |b| {
        b.iter(|| black_box(Game::from_uci_list(Position::initial(), moves).unwrap().len()))
    });
}

criterion_group!(
    chess,
    bench_pseudo_legal,
    bench_legal_moves,
    bench_make_move,
    bench_is_attacked,
    bench_has_legal_moves,
    bench_game,
);

criterion_main!(chess);
