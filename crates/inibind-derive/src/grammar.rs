//! Token grammar for the structs `#[derive(Record)]` accepts.

use unsynn::*;

unsynn! {
    keyword KPub = "pub";
    pub keyword KWhere = "where";
    keyword KIni = "ini";

    operator AttrPound = "#";
    operator FieldColon = ":";
    operator Equals = "=";
    operator AngleOpen = "<";
    operator AngleClose = ">";
    operator ThinArrow = "->";

    /// `#[...]`; the body is only inspected for `ini`.
    pub struct Attribute {
        pub pound: AttrPound,
        pub body: BracketGroupContaining<Vec<TokenTree>>,
    }

    /// `pub`, `pub(crate)`, `pub(in path)`.
    pub struct Visibility {
        pub pub_kw: KPub,
        pub scope: Option<ParenthesisGroup>,
    }

    /// Everything up to and including the item name.
    pub struct Header {
        pub attrs: Vec<Attribute>,
        pub vis: Option<Visibility>,
        pub kind: Ident,
        pub name: Ident,
    }

    pub enum Body {
        Named(BraceGroupContaining<Vec<TokenTree>>),
        Generic(AngleOpen),
        Where(KWhere),
        Other(Vec<TokenTree>),
    }

    /// One token of a type, with `<...>` kept together so commas inside
    /// generic arguments never end the type.
    pub enum TypeTree {
        Arrow(ThinArrow),
        Angle(Cons<AngleOpen, Vec<Cons<Except<AngleClose>, TypeTree>>, AngleClose>),
        Token(TokenTree),
    }

    pub struct FieldInput {
        pub attrs: Vec<Attribute>,
        pub vis: Option<Visibility>,
        pub name: Ident,
        pub colon: FieldColon,
        pub ty: Vec<Cons<Except<Comma>, TypeTree>>,
    }

    /// `ini(flatten, key = "...", default = ...)`
    pub struct IniAttribute {
        pub ini: KIni,
        pub args: ParenthesisGroupContaining<DelimitedVec<IniArg, Comma>>,
    }

    pub struct IniArg {
        pub name: Ident,
        pub value: Option<Cons<Equals, Vec<Cons<Except<Comma>, TokenTree>>>>,
    }
}
