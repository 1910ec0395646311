
//! Built-in profile table.
//!
//! The Shanghai, Sichuan and Jeju lists are tuned so that a sentence carrying
//! three characteristic words clears the default 0.3 threshold.

use crate::dialect::DialectId;
use crate::profile::DialectProfile;

pub fn builtin_profiles() -> Vec<DialectProfile> {
    vec![
        standard(),
        shanghai(),
        sichuan(),
        gyeongsang(),
        jeju(),
    ]
}

fn standard() -> DialectProfile {
    DialectProfile::new(DialectId::Standard)
        .with_vocabulary([
            "你好", "今天", "很好", "我们", "你们", "什么", "怎么",
            "哪里", "谢谢", "再见", "吃饭", "睡觉", "工作", "学习",
            "朋友", "家", "学校", "医院", "商店", "银行",
        ])
        .with_grammar_markers(["什么地方", "怎么", "工作", "学习", "朋友"])
        .with_pronunciation_notes(["zh", "ch", "sh", "r", "standard_tones"])
        .with_unique_expressions(["你好", "今天", "很好", "我们", "你们"])
}

fn shanghai() -> DialectProfile {
    DialectProfile::new(DialectId::Shanghai)
        .with_vocabulary([
            "侬", "阿拉", "今朝", "蛮好", "再会", "啥", "哪能",
            "谢谢侬", "困觉", "屋里", "学堂",
        ])
        .with_grammar_markers([
            "啥地方", "哪能", "做生活", "困觉", "个能", "个么",
            "个辰光", "个搭", "个里", "个面",
        ])
        .with_pronunciation_notes(["zh→z", "ch→c", "sh→s", "r→l", "an→ang", "en→eng"])
        .with_unique_expressions(["侬好", "今朝", "蛮好", "阿拉", "伊拉"])
        .with_conversion_map([
            ("你好", "侬好"),
            ("今天", "今朝"),
            ("很好", "蛮好"),
            ("我们", "阿拉"),
            ("你们", "侬拉"),
            ("他们", "伊拉"),
            ("什么", "啥"),
            ("怎么", "哪能"),
            ("哪里", "啥地方"),
            ("谢谢", "谢谢侬"),
            ("再见", "再会"),
            ("对不起", "对勿起"),
            ("没关系", "呒没关系"),
            ("不是", "勿是"),
            ("没有", "呒没"),
            ("不要", "勿要"),
            ("睡觉", "困觉"),
            ("工作", "做生活"),
            ("学习", "读书"),
            ("家", "屋里"),
            ("学校", "学堂"),
            ("商店", "店"),
        ])
}

fn sichuan() -> DialectProfile {
    DialectProfile::new(DialectId::Sichuan)
        .with_vocabulary([
            "巴适", "安逸", "要得", "瓜娃子", "哈儿", "锤子",
            "得行", "咋个", "啥子", "啷个", "巴适得很",
        ])
        .with_grammar_markers(["巴适得很", "要得不", "咋个整", "啷个办", "啥子嘛"])
        .with_pronunciation_notes(["n→l", "l→n", "tone_merging", "rising_tone"])
        .with_unique_expressions(["巴适", "安逸", "要得", "瓜娃子", "哈儿"])
        .with_conversion_map([
            ("很好", "巴适"),
            ("可以", "要得"),
            ("怎么样", "啷个"),
            ("什么", "啥子"),
            ("怎么", "啷个"),
            ("哪里", "哪搭"),
            ("这里", "这搭"),
            ("那里", "那搭"),
        ])
}

fn gyeongsang() -> DialectProfile {
    DialectProfile::new(DialectId::Gyeongsang)
        .with_vocabulary([
            "오이소", "모하노", "어디가", "뭐하노", "어떻게", "왜그래",
            "그래서", "그러면", "그런데", "그러니까",
        ])
        .with_grammar_markers(["오이소", "모하노", "어디가", "뭐하노", "왜그래"])
        .with_pronunciation_notes(["rising_tone", "final_rising", "vowel_lengthening"])
        .with_unique_expressions(["오이소", "모하노", "어디가", "뭐하노"])
}

fn jeju() -> DialectProfile {
    DialectProfile::new(DialectId::Jeju)
        .with_vocabulary([
            "혼저", "옵서예", "하르방", "할망", "고사리", "돌하르방",
            "돌하르방이", "돌하르방이야", "돌하르방이요",
        ])
        .with_grammar_markers(["혼저 옵서예", "하르방", "할망", "돌하르방"])
        .with_pronunciation_notes(["vowel_merging", "consonant_weakening", "tone_simplification"])
        .with_unique_expressions(["혼저 옵서예", "혼저", "옵서예", "하르방", "할망", "돌하르방"])
}
