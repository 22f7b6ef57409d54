//! Shared fixtures for integration tests.
//!
//! A page is described as text lines; `" | "` separates cells, which are
//! placed at fixed column offsets. The same description feeds both the
//! synthetic word pages and the generated PDFs, so the two paths see the
//! same geometry.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use sopdown::{PageWords, Word};

/// Left edge of each cell column.
pub const COLUMNS: [f32; 3] = [72.0, 120.0, 260.0];

pub const FONT_SIZE: f32 = 10.0;

/// Advance of one glyph: Helvetica without `/Widths` at 10pt.
pub const GLYPH: f32 = 5.0;

pub const TOP: f32 = 750.0;
pub const LEADING: f32 = 14.0;

fn cells(text: &str) -> Vec<(f32, &str)> {
    text.split(" | ")
        .enumerate()
        .map(|(i, cell)| (COLUMNS[i.min(COLUMNS.len() - 1)], cell))
        .filter(|(_, cell)| !cell.trim().is_empty())
        .collect()
}

/// Word boxes for one page, laid out the way the PDF fixture draws them.
pub fn page(number: u32, lines: &[&str]) -> PageWords {
    let mut words = Vec::new();
    for (i, text) in lines.iter().enumerate() {
        let y = TOP - i as f32 * LEADING;
        for (x, cell) in cells(text) {
            let mut left = x;
            for token in cell.split(' ') {
                if !token.is_empty() {
                    let right = left + token.chars().count() as f32 * GLYPH;
                    words.push(Word::new(token, left, right, y));
                }
                left += (token.chars().count() + 1) as f32 * GLYPH;
            }
        }
    }
    PageWords::new(number, 792.0, words)
}

pub fn pages(pages: &[&[&str]]) -> Vec<PageWords> {
    pages
        .iter()
        .enumerate()
        .map(|(i, lines)| page(i as u32 + 1, lines))
        .collect()
}

/// Build a PDF whose pages draw the given lines in Helvetica.
pub fn pdf_bytes(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => Object::Reference(font_id),
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        for (i, text) in lines.iter().enumerate() {
            let baseline = TOP - i as f32 * LEADING - FONT_SIZE * 0.3;
            for (x, cell) in cells(text) {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![Object::Name(b"F1".to_vec()), Object::Real(FONT_SIZE)],
                ));
                operations.push(Operation::new("Td", vec![Object::Real(x), Object::Real(baseline)]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(cell)]));
                operations.push(Operation::new("ET", vec![]));
            }
        }

        let content = Content { operations };
        let encoded = content.encode().expect("encode content stream");
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Reference(resources_id),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("save PDF");
    buffer
}

/// One page that places text through a `cm` translation and a Form XObject.
///
/// "First." is drawn at y 300 under a 400-unit upward translation, "Second."
/// directly at y 500, and "Third." inside form `Fm1` (own resources, 100-unit
/// downward `/Matrix`) at y 400. Page order from the top: First, Second, Third.
pub fn transformed_pdf_bytes() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let text = |font: &[u8], y: f32, body: &str| {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(font.to_vec()), Object::Real(FONT_SIZE)]),
            Operation::new("Td", vec![Object::Real(72.0), Object::Real(y)]),
            Operation::new("Tj", vec![Object::string_literal(body)]),
            Operation::new("ET", vec![]),
        ]
    };
    let translate = |dy: f32| {
        Operation::new(
            "cm",
            vec![
                Object::Integer(1),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(1),
                Object::Integer(0),
                Object::Real(dy),
            ],
        )
    };

    let form = Content {
        operations: text(b"F2", 400.0, "Third."),
    };
    let form_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
            "Matrix" => vec![
                Object::Integer(1),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(1),
                Object::Integer(0),
                Object::Integer(-100),
            ],
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    "F2" => Object::Reference(font_id),
                },
            },
        },
        form.encode().expect("encode form stream"),
    ));

    let mut operations = vec![Operation::new("q", vec![]), translate(400.0)];
    operations.extend(text(b"F1", 300.0, "First."));
    operations.push(Operation::new("Q", vec![]));
    operations.extend(text(b"F1", 500.0, "Second."));
    operations.push(Operation::new("Do", vec![Object::Name(b"Fm1".to_vec())]));
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("encode content stream"),
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "Contents" => Object::Reference(content_id),
        "Resources" => dictionary! {
            "Font" => dictionary! {
                "F1" => Object::Reference(font_id),
            },
            "XObject" => dictionary! {
                "Fm1" => Object::Reference(form_id),
            },
        },
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("save PDF");
    buffer
}

/// First page of the fitness-center procedure.
pub const FITNESS_FIRST_PAGE: &[&str] = &[
    "Integrated Management System",
    "Document No.:",
    "CLG-EN-PR-0175",
    "Fitness Center Access",
    "Effective Date:",
    "06/08/2023 G",
    "1.0 Purpose",
    "This procedure describes how employees gain",
    "access to the fitness center.",
    "6.0 Procedure",
    "Step | Responsibility | Action",
    "1 | Employee | Complete the waiver form",
    "2 | Security | Issue an access badge",
    "3 | Employee | Swipe the badge at the entrance",
    "Page: 1 of 1",
];
